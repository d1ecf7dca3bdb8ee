use clap::{Parser, ValueEnum};
use skyflight::{
    Simulation, SkyflightConfig, SkyflightErrors, control_panel::speed_readout,
    input::{InputEvent, InputListeners},
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, error, info};

#[derive(Debug, Parser)]
#[command(version, about = "Headless solar system free-flight simulation", long_about = None)]
struct Cli {
    /// RON configuration file, defaults are used for anything it leaves out
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Number of frames to simulate
    #[arg(short, long, default_value_t = 600)]
    frames: u64,
    /// Seconds per frame, overrides the configuration
    #[arg(long)]
    dt: Option<f64>,
    /// Keys held down for the whole run, e.g. --hold w,d
    #[arg(long, value_delimiter = ',')]
    hold: Vec<String>,
    /// Teleport destination applied before the first frame
    #[arg(short, long)]
    teleport: Option<String>,
    /// Seed for the orbit phases, overrides the configuration
    #[arg(short, long)]
    seed: Option<u64>,
    /// Show the body indicators
    #[arg(long)]
    indicators: bool,
    /// Print the effective configuration as RON and exit
    #[arg(long)]
    dump_config: bool,
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(Level::from(cli.log_level))
        .with_target(false)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), SkyflightErrors> {
    let mut config = match &cli.config {
        Some(path) => SkyflightConfig::from_file(path)?,
        None => SkyflightConfig::default(),
    };
    if let Some(dt) = cli.dt {
        config.frame.dt = dt;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    config.validate()?;

    if cli.dump_config {
        println!("{}", config.to_ron()?);
        return Ok(());
    }

    let mut listeners = InputListeners::new();
    let mut sim = Simulation::new(&config)?;
    sim.attach(&mut listeners);

    if let Some(destination) = &cli.teleport {
        sim.teleport(destination)?;
    }
    if cli.indicators {
        sim.toggle_indicators();
    }
    for key in &cli.hold {
        sim.handle_event(&InputEvent::KeyDown(key.clone()));
    }

    let frames_per_second = (1.0 / sim.dt()).round().max(1.0) as u64;
    for _ in 0..cli.frames {
        sim.tick();
        if sim.frame() % frames_per_second == 0 {
            let p = sim.craft().position();
            info!(
                "t = {:.2}s  position = ({:.1}, {:.1}, {:.1})  {}",
                sim.elapsed(),
                p[0],
                p[1],
                p[2],
                speed_readout(sim.hud_speed())
            );
        }
    }

    let snapshot = sim.snapshot();
    sim.dispose(&mut listeners);

    let p = sim.craft().position();
    println!("frames:          {}", sim.frame());
    println!("simulated time:  {:.3} s", sim.elapsed());
    println!("craft position:  ({:.3}, {:.3}, {:.3})", p[0], p[1], p[2]);
    println!("craft speed:     {:.3}", sim.craft().speed());
    println!("{}", speed_readout(sim.hud_speed()));
    println!("sun light:       {:.3e}", snapshot.sun_light_intensity);
    println!("indicators:      {}", snapshot.indicators.len());
    Ok(())
}
