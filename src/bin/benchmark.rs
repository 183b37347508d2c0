fn main() {
    if let Err(e) = run() {
        eprintln!("benchmark failed: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    use serde::Serialize;
    use std::path::PathBuf;
    use std::time::Instant;
    use vocalis_core::{AnalyzerConfig, Signal, VocalisError, VoiceAnalyzer};

    const SAMPLE_RATE: u32 = 16_000;
    const CASE_SECS: f64 = 3.0;

    #[derive(Debug)]
    struct Args {
        iterations: usize,
        output: Option<PathBuf>,
    }

    #[derive(Debug, Clone, Serialize)]
    struct CaseResult {
        case: String,
        iteration: usize,
        latency_ms: f64,
        detected: bool,
        mean_pitch: Option<f64>,
        jitter: Option<f64>,
        shimmer: Option<f64>,
    }

    #[derive(Debug, Clone, Serialize)]
    struct CaseSummary {
        case: String,
        runs: usize,
        detected_rate: f64,
        p50_latency_ms: f64,
        p95_latency_ms: f64,
        avg_latency_ms: f64,
        mean_pitch: Option<f64>,
        jitter: Option<f64>,
        shimmer: Option<f64>,
    }

    #[derive(Debug, Clone, Serialize)]
    struct Summary {
        iterations: usize,
        total_runs: usize,
        p50_latency_ms: f64,
        p95_latency_ms: f64,
        avg_latency_ms: f64,
        cases: Vec<CaseSummary>,
        runs: Vec<CaseResult>,
    }

    fn parse_args() -> Result<Args, String> {
        let mut iterations: usize = 10;
        let mut output: Option<PathBuf> = None;

        let mut it = std::env::args().skip(1);
        while let Some(arg) = it.next() {
            match arg.as_str() {
                "--iterations" => {
                    let Some(v) = it.next() else {
                        return Err("missing value for --iterations".into());
                    };
                    iterations = v
                        .parse::<usize>()
                        .map_err(|_| "invalid value for --iterations".to_string())?
                        .clamp(1, 1000);
                }
                "--output" => {
                    let Some(v) = it.next() else {
                        return Err("missing value for --output".into());
                    };
                    output = Some(PathBuf::from(v));
                }
                "--help" | "-h" => {
                    println!(
                        "Usage: cargo run --bin benchmark -- \
                         [--iterations <n>] [--output <file.json>]"
                    );
                    std::process::exit(0);
                }
                other => {
                    return Err(format!("unknown argument: {other}"));
                }
            }
        }

        Ok(Args { iterations, output })
    }

    fn sine(freq: f64, amplitude: f32, secs: f64, sr: u32) -> Vec<f32> {
        let n = (secs * f64::from(sr)) as usize;
        (0..n)
            .map(|i| {
                amplitude
                    * (2.0 * std::f64::consts::PI * freq * i as f64 / f64::from(sr)).sin() as f32
            })
            .collect()
    }

    /// Sine with sinusoidal frequency modulation, phase-accumulated so the
    /// instantaneous frequency is exact.
    fn vibrato(center: f64, depth: f64, rate: f64, amplitude: f32, secs: f64, sr: u32) -> Vec<f32> {
        let n = (secs * f64::from(sr)) as usize;
        let dt = 1.0 / f64::from(sr);
        let mut phase = 0.0f64;
        (0..n)
            .map(|i| {
                let t = i as f64 * dt;
                let inst = center + depth * (2.0 * std::f64::consts::PI * rate * t).sin();
                phase += 2.0 * std::f64::consts::PI * inst * dt;
                amplitude * phase.sin() as f32
            })
            .collect()
    }

    /// Sine with sinusoidal amplitude modulation.
    fn tremolo(freq: f64, depth: f64, rate: f64, amplitude: f32, secs: f64, sr: u32) -> Vec<f32> {
        let n = (secs * f64::from(sr)) as usize;
        (0..n)
            .map(|i| {
                let t = i as f64 / f64::from(sr);
                let envelope = 1.0 + depth * (2.0 * std::f64::consts::PI * rate * t).sin();
                let carrier = (2.0 * std::f64::consts::PI * freq * t).sin();
                amplitude * (envelope * carrier) as f32
            })
            .collect()
    }

    fn lcg_noise(amplitude: f32, secs: f64, sr: u32, mut state: u64) -> Vec<f32> {
        let n = (secs * f64::from(sr)) as usize;
        (0..n)
            .map(|_| {
                state = state.wrapping_mul(1103515245).wrapping_add(12345);
                let unit = ((state >> 16) & 0x7fff) as f32 / 32768.0;
                (unit * 2.0 - 1.0) * amplitude
            })
            .collect()
    }

    fn percentile(values: &[f64], p: f64) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        if sorted.len() == 1 {
            return sorted[0];
        }
        let idx = ((sorted.len() - 1) as f64 * p.clamp(0.0, 1.0)).round() as usize;
        sorted[idx.min(sorted.len() - 1)]
    }

    fn summarize(case: String, rows: &[CaseResult]) -> CaseSummary {
        let latencies = rows.iter().map(|r| r.latency_ms).collect::<Vec<_>>();
        let avg_latency_ms = if latencies.is_empty() {
            0.0
        } else {
            latencies.iter().sum::<f64>() / latencies.len() as f64
        };
        let detected = rows.iter().filter(|r| r.detected).count();
        let last = rows.last();
        CaseSummary {
            case,
            runs: rows.len(),
            detected_rate: if rows.is_empty() {
                0.0
            } else {
                detected as f64 / rows.len() as f64
            },
            p50_latency_ms: percentile(&latencies, 0.50),
            p95_latency_ms: percentile(&latencies, 0.95),
            avg_latency_ms,
            mean_pitch: last.and_then(|r| r.mean_pitch),
            jitter: last.and_then(|r| r.jitter),
            shimmer: last.and_then(|r| r.shimmer),
        }
    }

    let args = parse_args()?;

    let cases: Vec<(&str, Vec<f32>)> = vec![
        ("steady_sine", sine(220.0, 0.5, CASE_SECS, SAMPLE_RATE)),
        (
            "vibrato_sine",
            vibrato(220.0, 6.0, 5.0, 0.5, CASE_SECS, SAMPLE_RATE),
        ),
        (
            "tremolo_sine",
            tremolo(220.0, 0.3, 4.0, 0.5, CASE_SECS, SAMPLE_RATE),
        ),
        (
            "quiet_noise",
            lcg_noise(0.01, CASE_SECS, SAMPLE_RATE, 0x2545_f491),
        ),
    ];

    println!(
        "Running vocalis benchmark on {} synthetic cases (iterations={})",
        cases.len(),
        args.iterations
    );

    let mut runs = Vec::new();
    for (name, samples) in &cases {
        let signal = Signal::new(samples.clone(), SAMPLE_RATE);
        let mut analyzer = VoiceAnalyzer::new(AnalyzerConfig::default());

        for iteration in 1..=args.iterations {
            let started = Instant::now();
            let outcome = analyzer.analyze(&signal);
            let latency_ms = started.elapsed().as_secs_f64() * 1000.0;

            let (detected, report) = match outcome {
                Ok(report) => (true, Some(report)),
                Err(VocalisError::NoPitchDetected) => (false, None),
                Err(e) => return Err(format!("{name}: {e}")),
            };
            runs.push(CaseResult {
                case: (*name).to_string(),
                iteration,
                latency_ms,
                detected,
                mean_pitch: report.as_ref().map(|r| r.mean_pitch),
                jitter: report.as_ref().and_then(|r| r.jitter),
                shimmer: report.as_ref().and_then(|r| r.shimmer),
            });
            println!(
                "{name} [{iteration}/{iters}] {latency:.1} ms",
                iters = args.iterations,
                latency = latency_ms
            );
        }
    }

    let mut case_summaries = Vec::new();
    for (name, _) in &cases {
        let rows: Vec<CaseResult> = runs.iter().filter(|r| r.case == *name).cloned().collect();
        case_summaries.push(summarize((*name).to_string(), &rows));
    }

    let all_latencies = runs.iter().map(|r| r.latency_ms).collect::<Vec<_>>();
    let summary = Summary {
        iterations: args.iterations,
        total_runs: runs.len(),
        p50_latency_ms: percentile(&all_latencies, 0.50),
        p95_latency_ms: percentile(&all_latencies, 0.95),
        avg_latency_ms: if all_latencies.is_empty() {
            0.0
        } else {
            all_latencies.iter().sum::<f64>() / all_latencies.len() as f64
        },
        cases: case_summaries,
        runs,
    };

    println!(
        "Done. runs={} p50={:.1}ms p95={:.1}ms",
        summary.total_runs, summary.p50_latency_ms, summary.p95_latency_ms
    );

    let json = serde_json::to_string_pretty(&summary).map_err(|e| e.to_string())?;
    if let Some(out) = args.output {
        if let Some(parent) = out.parent() {
            std::fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        std::fs::write(&out, json).map_err(|e| e.to_string())?;
        println!("Wrote benchmark report: {}", out.display());
    } else {
        println!("{json}");
    }

    Ok(())
}
