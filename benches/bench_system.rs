use criterion::{
  Criterion,
  criterion_group,
  criterion_main,
};
use std::hint::black_box;
use sysutil::{
  MemoryKind,
  getenv,
  hardware_concurrency,
  local_time,
  memory_used,
  terminal_size,
};

fn bench_memory_used(c: &mut Criterion) {
  c.bench_function("memory_used_resident", |b| {
    b.iter(|| black_box(memory_used(MemoryKind::Resident)));
  });
  c.bench_function("memory_used_virtual", |b| {
    b.iter(|| black_box(memory_used(MemoryKind::Virtual)));
  });
}

fn bench_terminal_size(c: &mut Criterion) {
  c.bench_function("terminal_size", |b| {
    b.iter(|| black_box(terminal_size()));
  });
}

fn bench_getenv(c: &mut Criterion) {
  c.bench_function("getenv_path", |b| {
    b.iter(|| black_box(getenv(black_box("PATH"), "")));
  });
  c.bench_function("getenv_absent", |b| {
    b.iter(|| black_box(getenv(black_box("SYSUTIL_BENCH_ABSENT"), "fallback")));
  });
}

fn bench_local_time(c: &mut Criterion) {
  c.bench_function("local_time", |b| {
    b.iter(|| black_box(local_time(black_box(1_700_000_000))));
  });
}

fn bench_hardware_concurrency(c: &mut Criterion) {
  c.bench_function("hardware_concurrency", |b| {
    b.iter(|| black_box(hardware_concurrency()));
  });
}

criterion_group!(
  benches,
  bench_memory_used,
  bench_terminal_size,
  bench_getenv,
  bench_local_time,
  bench_hardware_concurrency
);
criterion_main!(benches);
