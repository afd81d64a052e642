use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use talentdesk_auth::{AccessGate, Membership, Permission, PrincipalId, Requirement, Role, Scope, resolve};
use talentdesk_core::ScopeId;

/// A principal with one org-wide grant and `n` talent-scoped grants.
fn memberships(principal: PrincipalId, n: usize) -> Vec<Membership> {
    let mut out = vec![Membership::org_wide(principal, Role::Viewer)];
    for i in 0..n {
        let role = Role::ALL[i % Role::ALL.len()];
        let scope = ScopeId::new(format!("talent-{i}")).expect("valid scope id");
        out.push(Membership::scoped(principal, role, scope));
    }
    out
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");
    let principal = PrincipalId::new();

    for n in [1usize, 16, 256] {
        let ms = memberships(principal, n);
        let scope = Scope::Talent(ScopeId::new(format!("talent-{}", n / 2)).expect("valid scope id"));

        group.throughput(Throughput::Elements(ms.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &ms, |b, ms| {
            b.iter(|| resolve(black_box(ms), black_box(&scope)))
        });
    }

    group.finish();
}

fn bench_gate(c: &mut Criterion) {
    let principal = PrincipalId::new();
    let gate = AccessGate::new(principal, memberships(principal, 64));
    let scope = Scope::Talent(ScopeId::new("talent-10").expect("valid scope id"));
    let requirement = Requirement::all_of([Permission::CreateTasks, Permission::ViewTeam]);

    c.bench_function("gate_check", |b| {
        b.iter(|| gate.check(black_box(&scope), black_box(&requirement)))
    });
}

criterion_group!(benches, bench_resolve, bench_gate);
criterion_main!(benches);
