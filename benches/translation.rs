use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rand::{Rng, SeedableRng, rngs::StdRng};

use digiseq::{Alphabet, GeneticCode};

fn criterion_benchmark(c: &mut Criterion) {
    let mut rng = StdRng::from_os_rng();

    let (dna, amino) = (Alphabet::dna(), Alphabet::amino());
    let gcode = GeneticCode::new(&dna, &amino).expect("standard alphabets suit the standard code");

    let lens = [16, 256, 1024];

    let mut g = c.benchmark_group("canonical translation");
    for len in lens {
        g.throughput(Throughput::Elements(len));
        g.bench_function(BenchmarkId::from_parameter(len), |b| {
            b.iter_batched_ref(
                || (0..len).map(|_| rng.random_range(0..4)).collect::<Vec<u8>>(),
                |codes| gcode.translate_to_vec(codes),
                BatchSize::SmallInput,
            )
        });
    }
    g.finish();

    let mut g = c.benchmark_group("degenerate translation");
    for len in lens {
        g.throughput(Throughput::Elements(len));
        g.bench_function(BenchmarkId::from_parameter(len), |b| {
            b.iter_batched_ref(
                || (0..len).map(|_| rng.random_range(0..16)).collect::<Vec<u8>>(),
                |codes| gcode.translate_to_vec(codes),
                BatchSize::SmallInput,
            )
        });
    }
    g.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
