#![forbid(unsafe_code)]

//! Post Aid shell binary entry point.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use postaid::{
    FileStore, ForecastSource, Geocoder, KakaoGeocoder, KmaClient, MemoryStore, Program,
    ProgramConfig, RecordStore,
};
use postaid_demo::app::{self, AppModel, Services};
use postaid_demo::cli::{self, Action, Opts};
use postaid_demo::config::Config;
use postaid_demo::input::parse_line;
use postaid_demo::view;
use tracing_subscriber::EnvFilter;

/// How long a command may keep the prompt waiting for its tasks.
const COMMAND_SETTLE: Duration = Duration::from_millis(250);

fn main() {
    let opts = match Opts::parse_from(std::env::args().skip(1)) {
        Ok(Action::Run(opts)) => opts,
        Ok(Action::Help) => {
            println!("{}", cli::HELP_TEXT);
            return;
        }
        Ok(Action::Version) => {
            println!("postaid {}", cli::VERSION);
            return;
        }
        Err(e) => {
            eprintln!("{e}\n\n{}", cli::HELP_TEXT);
            std::process::exit(2);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let mut config = match Config::load(opts.config.as_deref(), |k| std::env::var(k).ok()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };
    if let Some(path) = &opts.store {
        config.store_path = Some(path.clone());
    }

    let services = match build_services(&config, &opts) {
        Ok(services) => services,
        Err(e) => {
            eprintln!("Failed to initialize: {e}");
            std::process::exit(1);
        }
    };

    let mut program = Program::new(AppModel::new(&config, services), ProgramConfig::threaded());
    app::connect_store(&mut program);
    program.init();
    // the briefing has its own deadline; geocoding is bounded per address
    program.wait_idle(config.weather_timeout() + Duration::from_secs(1));

    if let Err(e) = run(&mut program) {
        eprintln!("I/O error: {e}");
        std::process::exit(1);
    }
}

fn build_services(config: &Config, opts: &Opts) -> postaid::Result<Services> {
    let seeds = config.seed_records();
    let store: Arc<dyn RecordStore> = match &config.store_path {
        Some(path) => Arc::new(FileStore::open_or_seed(path, seeds)?),
        None => Arc::new(MemoryStore::with_records(seeds)),
    };

    let mut forecast: Option<Arc<dyn ForecastSource>> = None;
    let mut geocoder: Option<Arc<dyn Geocoder>> = None;
    if opts.offline {
        tracing::info!("offline, network services disabled");
    } else {
        if let Some(kma) = config.kma() {
            forecast = Some(Arc::new(KmaClient::new(kma)?));
        }
        if let Some(kakao) = config.kakao() {
            geocoder = Some(Arc::new(KakaoGeocoder::new(kakao)?));
        }
    }

    Ok(Services {
        store,
        forecast,
        geocoder,
    })
}

fn run(program: &mut Program<AppModel>) -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut lines = stdin.lock().lines();

    while program.is_running() {
        program.pump();
        let mut screen = String::new();
        view::render_logs(&program.take_logs(), &mut screen);
        screen.push_str(&program.render());
        write!(stdout, "{screen}\n> ")?;
        stdout.flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        match parse_line(&line?) {
            Ok(Some(msg)) => {
                program.send(msg);
                program.wait_idle(COMMAND_SETTLE);
            }
            Ok(None) => {}
            Err(e) => writeln!(stdout, "! {e}")?,
        }
    }
    Ok(())
}
