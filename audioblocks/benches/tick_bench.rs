//! Criterion benchmarks for the tick path
//!
//! Run with: cargo bench
#![allow(missing_docs)]

use std::sync::Arc;

use audioblocks::block::BlockPool;
use audioblocks::config::AudioConfig;
use audioblocks::graph::AudioGraph;
use audioblocks::nodes::{
    AudioAmplifier, AudioAnalyzeRms, AudioEffectDelay, AudioMixer, AudioSynthSine,
};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

const FRAME_SIZES: &[usize] = &[32, 64, 128];

fn bench_pool(c: &mut Criterion) {
    let pool = BlockPool::new(&AudioConfig::default()).unwrap();
    c.bench_function("pool_allocate_release", |b| {
        b.iter(|| {
            let block = pool.allocate();
            black_box(block.is_some())
        })
    });
}

/// sine → amp → mixer ← sine, mixer → delay → rms
fn build_patch(frame_len: usize) -> AudioGraph {
    let config = AudioConfig::default().with_frame_len(frame_len);
    let pool = BlockPool::new(&config).unwrap();
    let mut g = AudioGraph::new(Arc::clone(&pool));
    let a = g.add_node(AudioSynthSine::new());
    let b = g.add_node(AudioSynthSine::new());
    let amp = g.add_node(AudioAmplifier::new());
    let mixer = g.add_node(AudioMixer::<2>::new());
    let delay = g.add_node(AudioEffectDelay::new(4_096));
    let rms = g.add_node(AudioAnalyzeRms::new());
    g.connect(a, 0, amp, 0).unwrap();
    g.connect(amp, 0, mixer, 0).unwrap();
    g.connect(b, 0, mixer, 1).unwrap();
    g.connect(mixer, 0, delay, 0).unwrap();
    g.connect(delay, 0, rms, 0).unwrap();

    for (node, hz) in [(a, 440.0), (b, 660.0)] {
        let s = g.node_mut(node).unwrap();
        s.frequency(hz);
        s.amplitude(0.5);
    }
    g.node_mut(amp).unwrap().gain(0.8);
    g.node_mut(delay).unwrap().set_delay_samples(1_000);
    g
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_tick");
    for &frame_len in FRAME_SIZES {
        let mut graph = build_patch(frame_len);
        group.bench_with_input(BenchmarkId::from_parameter(frame_len), &frame_len, |b, _| {
            b.iter(|| {
                graph.tick();
                black_box(graph.stats().ticks)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_pool, bench_tick);
criterion_main!(benches);
