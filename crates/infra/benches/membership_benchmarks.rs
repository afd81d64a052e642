use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use talentdesk_auth::{Membership, PrincipalId, Role, Scope};
use talentdesk_core::ScopeId;
use talentdesk_infra::{InMemoryMembershipStore, MembershipLookup};

/// Lookup cost through the store boundary, as a request would pay it.
fn bench_lookup(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("tokio runtime");
    let mut group = c.benchmark_group("lookup_resolve");

    for principals in [10usize, 1_000] {
        let target = PrincipalId::new();
        let mut memberships = Vec::new();
        for i in 0..principals {
            let p = if i == 0 { target } else { PrincipalId::new() };
            memberships.push(Membership::org_wide(p, Role::Viewer));
            let scope = ScopeId::new(format!("talent-{i}")).expect("valid scope id");
            memberships.push(Membership::scoped(p, Role::Editor, scope));
        }

        let lookup = MembershipLookup::new(Arc::new(InMemoryMembershipStore::with_memberships(memberships)));
        let scope = Scope::Talent(ScopeId::new("talent-0").expect("valid scope id"));

        group.bench_with_input(BenchmarkId::from_parameter(principals), &lookup, |b, lookup| {
            b.iter(|| rt.block_on(lookup.resolve_for(black_box(target), black_box(&scope))))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_lookup);
criterion_main!(benches);
