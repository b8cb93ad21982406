use criterion::{
  Criterion,
  criterion_group,
  criterion_main,
};
use rand::Rng;
use std::hint::black_box;
use sysutil::Term;

fn bench_ansi_command(c: &mut Criterion) {
  let term = Term::forced(true);
  c.bench_function("ansi_bold_green_white_bg", |b| {
    b.iter(|| black_box(term.ansi(black_box("bold,green,white_bg"))));
  });
}

fn bench_ansi_text(c: &mut Criterion) {
  let term = Term::forced(true);
  c.bench_function("ansi_text_short", |b| {
    b.iter(|| black_box(term.ansi_text(black_box("bold,red"), black_box("warning"))));
  });
}

fn bench_ansi_suppressed(c: &mut Criterion) {
  let term = Term::forced(false);
  c.bench_function("ansi_text_non_console", |b| {
    b.iter(|| black_box(term.ansi_text(black_box("bold,red"), black_box("warning"))));
  });
}

fn bench_truecolor(c: &mut Criterion) {
  let term = Term::forced(true);
  let mut rng = rand::rng();
  let colors: Vec<(i32, i32, i32)> = (0..256)
    .map(|_| {
      (
        rng.random_range(0..=255),
        rng.random_range(0..=255),
        rng.random_range(0..=255),
      )
    })
    .collect();

  c.bench_function("ansi_fgcolor_256", |b| {
    b.iter(|| {
      for &(r, g, bl) in &colors {
        black_box(term.ansi_fgcolor(r, g, bl));
      }
    });
  });
}

criterion_group!(
  benches,
  bench_ansi_command,
  bench_ansi_text,
  bench_ansi_suppressed,
  bench_truecolor
);
criterion_main!(benches);
