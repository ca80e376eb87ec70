use crossbeam_channel::{bounded, TrySendError};
use edgeflow_engine::{
    convert_yuv420_to_rgba, logging, Engine, EngineConfig, ProcessingMode, Yuv420Planes,
};
use std::thread;
use std::time::{Duration, Instant};

const WIDTH: u32 = 640;
const HEIGHT: u32 = 480;
const CAPTURED_FRAMES: u32 = 120;

/// Build a moving gradient as planar YUV 4:2:0 and convert it to RGBA.
fn synthesize_frame(index: u32) -> Vec<u8> {
    let (w, h) = (WIDTH as usize, HEIGHT as usize);
    let mut y = vec![0u8; w * h];
    for row in 0..h {
        for col in 0..w {
            y[row * w + col] = ((col + row + index as usize * 4) % 220 + 16) as u8;
        }
    }
    let chroma = (w / 2) * (h / 2);
    let u = vec![(96 + index % 64) as u8; chroma];
    let v = vec![160u8; chroma];

    let planes = Yuv420Planes {
        y: &y,
        u: &u,
        v: &v,
        y_row_stride: w,
        uv_row_stride: w / 2,
        uv_pixel_stride: 1,
    };
    let mut rgba = vec![0u8; w * h * 4];
    if let Err(e) = convert_yuv420_to_rgba(&planes, WIDTH, HEIGHT, &mut rgba) {
        eprintln!("YUV conversion failed: {}", e);
        std::process::exit(1);
    }
    rgba
}

fn main() {
    logging::init();

    let engine = match Engine::new(EngineConfig::default()) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Failed to create engine: {}", e);
            std::process::exit(1);
        }
    };
    engine.initialize();
    println!(
        "Engine ready: {} (optimized backend: {})",
        engine.is_ready(),
        engine.is_optimized_backend_available()
    );

    let frame = synthesize_frame(0);
    let mut output = vec![0u8; frame.len()];

    println!("\nRunning warmup pass...");
    for mode in [ProcessingMode::Raw, ProcessingMode::Grayscale, ProcessingMode::Edge] {
        engine.process(&frame, WIDTH, HEIGHT, mode, &mut output);
    }

    // Per-mode latency
    let iterations = 20u32;
    println!("\nBenchmarking {} frames per mode at {}x{}...", iterations, WIDTH, HEIGHT);
    for mode in [ProcessingMode::Raw, ProcessingMode::Grayscale, ProcessingMode::Edge] {
        let mut total = Duration::ZERO;
        for _ in 0..iterations {
            let result = engine.process(&frame, WIDTH, HEIGHT, mode, &mut output);
            if !result.success {
                eprintln!("  {} frame failed", mode);
                continue;
            }
            total += Duration::from_secs_f64(result.processing_time_ms / 1000.0);
        }
        let avg_ms = total.as_secs_f64() * 1000.0 / iterations as f64;
        println!("  {:<9} avg {:6.2} ms ({:.1} FPS)", mode, avg_ms, 1000.0 / avg_ms.max(1e-6));
    }

    // Simulated camera: one frame in flight, newer frames dropped while busy
    println!("\nSimulating camera at ~30 FPS with {} captured frames...", CAPTURED_FRAMES);
    let (tx, rx) = bounded::<Vec<u8>>(1);
    let start = Instant::now();

    let producer = thread::spawn(move || {
        let mut dropped = 0u32;
        for i in 0..CAPTURED_FRAMES {
            match tx.try_send(synthesize_frame(i)) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => dropped += 1,
                Err(TrySendError::Disconnected(_)) => break,
            }
            thread::sleep(Duration::from_millis(33));
        }
        dropped
    });

    let modes = [ProcessingMode::Edge, ProcessingMode::Grayscale, ProcessingMode::Raw];
    let mut processed = 0u32;
    for (i, frame) in rx.iter().enumerate() {
        let mode = modes[i % modes.len()];
        if engine.process(&frame, WIDTH, HEIGHT, mode, &mut output).success {
            processed += 1;
        }
    }
    let dropped = producer.join().unwrap_or(0);
    let elapsed = start.elapsed();

    println!("\n=== Results ===");
    println!("Captured:  {}", CAPTURED_FRAMES);
    println!("Processed: {}", processed);
    println!("Dropped:   {}", dropped);
    println!("Wall time: {:.2} s", elapsed.as_secs_f64());
    println!("{}", engine.statistics_string());

    engine.release();
}
