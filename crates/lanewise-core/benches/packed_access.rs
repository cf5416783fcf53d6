use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use half::f16;
use lanewise_core::memory::{CacheHintBackend, NativeBackend};
use lanewise_core::{streaming_fence, DType, Fp16, Packed128};

fn benchmark_copy_hints(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("packed_copy_{}", NativeBackend::NAME));

    for vectors in [1_024usize, 65_536, 1_048_576].iter() {
        group.throughput(Throughput::Bytes((*vectors * 16) as u64));

        let src = vec![Packed128::<f16>::constant(f16::from_f32(1.0)); *vectors];
        let mut dst = vec![Packed128::<f16>::zeros(); *vectors];

        group.bench_with_input(BenchmarkId::new("default", vectors), vectors, |b, _| {
            b.iter(|| {
                for (s, d) in src.iter().zip(dst.iter_mut()) {
                    Packed128::load(s).store(d);
                }
                black_box(&dst);
            });
        });

        group.bench_with_input(BenchmarkId::new("streaming", vectors), vectors, |b, _| {
            b.iter(|| {
                for (s, d) in src.iter().zip(dst.iter_mut()) {
                    Packed128::load_streaming(s).store_streaming(d);
                }
                streaming_fence();
                black_box(&dst);
            });
        });

        group.bench_with_input(BenchmarkId::new("cached_global", vectors), vectors, |b, _| {
            b.iter(|| {
                for (s, d) in src.iter().zip(dst.iter_mut()) {
                    Packed128::load(s).store_cached_global(d);
                }
                black_box(&dst);
            });
        });
    }

    group.finish();
}

fn benchmark_fp16_scale(c: &mut Criterion) {
    let mut group = c.benchmark_group("fp16_scale");
    let src = vec![Packed128::<f16>::constant(f16::from_f32(0.75)); 65_536];
    let mut dst = vec![Packed128::<f16>::zeros(); 65_536];
    group.throughput(Throughput::Elements((src.len() * Packed128::<f16>::LANES) as u64));

    group.bench_function("upcast_mul_downcast", |b| {
        b.iter(|| {
            for (s, d) in src.iter().zip(dst.iter_mut()) {
                let mut v = Packed128::load_streaming(s);
                for lane in v.iter_mut() {
                    *lane = Fp16::downcast(Fp16::upcast(*lane) * black_box(2.0));
                }
                v.store(d);
            }
            black_box(&dst);
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_copy_hints, benchmark_fp16_scale);
criterion_main!(benches);
