use criterion::{black_box, criterion_group, criterion_main, Criterion};
use futures::executor::block_on;
use vali_mediator::{
    async_trait, impl_notification, impl_request, CancellationToken, HandlerResult, Mediator,
    NotificationHandler, RequestHandler, TracingBehavior,
};

struct Add(u64, u64);
impl_request!(Add => u64);

struct Ticked;
impl_notification!(Ticked);

struct AddHandler;

#[async_trait]
impl RequestHandler<Add> for AddHandler {
    async fn handle(&self, request: &Add, _: &CancellationToken) -> HandlerResult<u64> {
        Ok(request.0 + request.1)
    }
}

struct Listener(i32);

#[async_trait]
impl NotificationHandler<Ticked> for Listener {
    async fn handle(&self, _: &Ticked, _: &CancellationToken) -> HandlerResult<()> {
        Ok(())
    }

    fn priority(&self) -> i32 {
        self.0
    }
}

fn benchmark_send_without_behaviors(c: &mut Criterion) {
    let mediator = Mediator::builder()
        .request_handler(AddHandler)
        .build()
        .unwrap();

    c.bench_function("send_without_behaviors", |b| {
        b.iter(|| block_on(mediator.send(black_box(&Add(2, 3)))).unwrap())
    });
}

fn benchmark_send_with_behaviors(c: &mut Criterion) {
    let mediator = (0..4)
        .fold(Mediator::builder().request_handler(AddHandler), |builder, i| {
            builder.request_behavior::<Add, _>(TracingBehavior::with_label(format!("layer-{i}")))
        })
        .build()
        .unwrap();

    c.bench_function("send_with_four_behaviors", |b| {
        b.iter(|| block_on(mediator.send(black_box(&Add(2, 3)))).unwrap())
    });
}

fn benchmark_publish_fan_out(c: &mut Criterion) {
    let mediator = (0..16)
        .fold(Mediator::builder(), |builder, priority| {
            builder.notification_handler(Listener(priority % 4))
        })
        .build()
        .unwrap();

    c.bench_function("publish_to_sixteen_subscribers", |b| {
        b.iter(|| block_on(mediator.publish(black_box(&Ticked))).unwrap())
    });
}

criterion_group!(
    benches,
    benchmark_send_without_behaviors,
    benchmark_send_with_behaviors,
    benchmark_publish_fan_out
);
criterion_main!(benches);
