use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use async_trait::async_trait;
use futures::executor::block_on;
use permkit_auth::{
    Check, CheckOutcome, CheckResult, Constant, Deps, Failing, HasRole, Permission, ResolveError,
    ResolveErrorKind, Slot, lazy,
};

#[derive(Debug, Default)]
struct Request;

/// Check with a fixed answer and no inputs.
struct Fixed(bool);

#[async_trait]
impl Check<Request> for Fixed {
    async fn check(&self, _ctx: &Request, _deps: &Deps) -> CheckResult {
        Ok(self.0.into())
    }
}

fn role(name: &str) -> Slot<Request> {
    Constant::new("role", name.to_string()).slot()
}

/// `a0 & a1 & ... & aN`, every leaf granting.
fn wide_and(width: usize) -> Permission<Request> {
    Permission::all((0..width).map(|_| Permission::new(Fixed(true))))
}

/// `d0 | d1 | ... | g`, only the last leaf granting.
fn wide_or(width: usize) -> Permission<Request> {
    Permission::any((0..width).map(|i| Permission::new(Fixed(i + 1 == width))))
}

fn bench_single_leaf(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_leaf");

    let bare = Permission::new(Fixed(true));
    group.bench_function("no_slots", |b| {
        b.iter(|| block_on(black_box(&bare).evaluate(&Request)))
    });

    let with_slot = Permission::new(HasRole::new(role("admin"), ["admin", "editor"]));
    group.bench_function("one_slot", |b| {
        b.iter(|| block_on(black_box(&with_slot).evaluate(&Request)))
    });

    group.finish();
}

fn bench_composition_width(c: &mut Criterion) {
    let mut group = c.benchmark_group("composition_width");

    for width in [2usize, 8, 32, 128] {
        group.throughput(Throughput::Elements(width as u64));

        let and = wide_and(width);
        group.bench_with_input(BenchmarkId::new("and_all_granted", width), &and, |b, p| {
            b.iter(|| {
                let outcome = block_on(p.evaluate(&Request));
                assert_eq!(outcome, Ok(CheckOutcome::Granted));
            })
        });

        let or = wide_or(width);
        group.bench_with_input(BenchmarkId::new("or_last_granted", width), &or, |b, p| {
            b.iter(|| block_on(p.evaluate(&Request)))
        });
    }

    group.finish();
}

fn bench_lazy_skip(c: &mut Criterion) {
    let mut group = c.benchmark_group("lazy");

    let missing = Permission::new(HasRole::new(
        Failing::new("article_id", ResolveError::validation("missing path parameter")).slot(),
        ["author"],
    ));
    let p = lazy(missing, ResolveErrorKind::Validation) | Permission::new(Fixed(true));

    group.bench_function("skip_then_grant", |b| {
        b.iter(|| block_on(black_box(&p).evaluate(&Request)))
    });

    group.finish();
}

criterion_group!(benches, bench_single_leaf, bench_composition_width, bench_lazy_skip);
criterion_main!(benches);
