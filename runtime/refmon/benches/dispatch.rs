//! Message dispatch benchmarks.
//!
//! Measures the cost of a message through the full check path (routing,
//! ACL lookup, range check, handler call) against the table lookup alone.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use refmon::acl::find_attribute_acl;
use refmon::algo::ALGO_DES;
use refmon::{AttributeId, CreateArgs, Kernel, KernelConfig, Message, MessageData, MessageType, ObjectHandle, ObjectType};

fn setup() -> (Kernel, ObjectHandle) {
    let kernel = Kernel::start(KernelConfig {
        run_self_test: false,
        ..KernelConfig::default()
    })
    .expect("kernel start");
    let args = CreateArgs {
        arg1: ALGO_DES,
        ..CreateArgs::default()
    };
    let context = kernel
        .send(
            ObjectHandle::SYSTEM_DEVICE,
            Message::new(MessageType::DevCreateObject, ObjectType::Context as i32, MessageData::Create(args)),
        )
        .ok()
        .and_then(|data| data.as_handle())
        .expect("create context");
    kernel
        .send(context, Message::set_attribute(AttributeId::CTXINFO_MODE, 2))
        .expect("set mode");
    (kernel, context)
}

/// Benchmark attribute messages through the kernel.
fn bench_attribute_messages(c: &mut Criterion) {
    let (kernel, context) = setup();
    let mut group = c.benchmark_group("dispatch/attribute");

    group.bench_function("get", |b| {
        b.iter(|| kernel.send(black_box(context), Message::get_attribute(AttributeId::CTXINFO_MODE)));
    });

    group.bench_function("set", |b| {
        b.iter(|| kernel.send(black_box(context), Message::set_attribute(AttributeId::CTXINFO_MODE, black_box(3))));
    });

    group.bench_function("set_rejected", |b| {
        b.iter(|| kernel.send(black_box(context), Message::set_attribute(AttributeId::CTXINFO_MODE, black_box(9))));
    });

    group.bench_function("property", |b| {
        b.iter(|| kernel.send(black_box(context), Message::get_attribute(AttributeId::PROPERTY_LOCKED)));
    });

    group.finish();
}

/// Benchmark encrypt actions on a keyed context.
fn bench_actions(c: &mut Criterion) {
    let (kernel, context) = setup();
    kernel
        .send(context, Message::set_attribute_s(AttributeId::CTXINFO_KEY, &[0x42; 16]))
        .expect("load key");
    let mut group = c.benchmark_group("dispatch/action");

    group.bench_function("encrypt_64", |b| {
        b.iter(|| {
            kernel.send(
                black_box(context),
                Message::new(MessageType::CtxEncrypt, 0, MessageData::Bytes(vec![0; 64])),
            )
        });
    });

    group.finish();
}

/// Benchmark ACL table lookup on its own.
fn bench_acl_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("acl/lookup");

    group.bench_function("context", |b| {
        b.iter(|| find_attribute_acl(black_box(AttributeId::CTXINFO_MODE), false));
    });

    group.bench_function("internal_hidden", |b| {
        b.iter(|| find_attribute_acl(black_box(AttributeId::IATTRIBUTE_TYPE), false));
    });

    group.bench_function("all_ids", |b| {
        b.iter(|| AttributeId::all().filter_map(|id| find_attribute_acl(id, true)).count());
    });

    group.finish();
}

criterion_group!(benches, bench_attribute_messages, bench_actions, bench_acl_lookup);
criterion_main!(benches);
