//! Command-line runner for scrolltap actions against a simulated screen.
//!
//! Loads a screen fixture (JSON), then scrolls an element into view or taps
//! it after scrolling, exactly as a test would through the library.
//!
//! # Usage
//!
//! ```bash
//! # Scroll a row into view inside the "feed" scroll view
//! scrolltap --screen screen.json scroll-to row-40 --within feed
//!
//! # Match by label, filter by type, and tap once visible
//! scrolltap --screen screen.json tap "Sign Out" -l -T Button --within settings
//!
//! # Custom swipe size and direction
//! scrolltap --screen screen.json scroll-to header --within feed --distance 120 --direction up
//!
//! # JSON output, tighter budget
//! scrolltap --screen screen.json -f json --max-swipes 10 tap row-40 --within feed
//!
//! # List what is on screen before any scrolling
//! scrolltap --screen screen.json screen-info
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use scrolltap_core::config::ScrolltapConfig;
use scrolltap_core::driver::{DriverError, ElementHandle, ScrollDriver};
use scrolltap_core::element::UIElement;
use scrolltap_core::gesture::{Direction, Gesture, ScrollDistance};
use scrolltap_core::helper::{HelperError, ScrollAndTapHelper, ScrollOptions};
use scrolltap_core::location::SourceLocation;
use scrolltap_core::matcher::{self, Matcher};
use scrolltap_core::simulated::SimulatedScreen;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Run scroll-into-view and tap actions against a simulated screen.
#[derive(Parser)]
#[command(name = "scrolltap")]
#[command(about = "Scroll elements into view and tap them on a simulated screen")]
#[command(version)]
struct Cli {
    /// Screen fixture (JSON) to run against
    #[arg(short, long, env = "SCROLLTAP_SCREEN")]
    screen: PathBuf,

    /// Config file (defaults to ~/.scrolltap/config.json)
    #[arg(short, long, env = "SCROLLTAP_CONFIG")]
    config: Option<PathBuf>,

    /// Output format: text or json
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Search timeout in milliseconds (overrides config)
    #[arg(short = 'o', long, env = "SCROLLTAP_TIMEOUT")]
    timeout: Option<u64>,

    /// Maximum swipes per search (overrides config)
    #[arg(long)]
    max_swipes: Option<u32>,

    /// Take the first visible match instead of failing on duplicates
    #[arg(long)]
    non_strict: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Scroll an element into view inside a scroll view
    ScrollTo(TargetArgs),

    /// Scroll an element into view, then tap it
    Tap(TargetArgs),

    /// List the elements visible before any scrolling
    ScreenInfo,
}

#[derive(Args)]
struct TargetArgs {
    /// The selector (accessibility ID or label)
    selector: String,
    /// Match by accessibility label instead of ID
    #[arg(short, long)]
    label: bool,
    /// Filter by element type (e.g., Button, Cell)
    #[arg(short = 'T', long = "type")]
    element_type: Option<String>,
    /// Selector of the scroll view to swipe in
    #[arg(short, long)]
    within: String,
    /// Match the scroll view by label instead of ID
    #[arg(long)]
    within_label: bool,
    /// Points per swipe (defaults to half the screen along the scroll axis)
    #[arg(short, long)]
    distance: Option<f64>,
    /// Swipe direction: down, up, left, right
    #[arg(long, default_value = "down")]
    direction: Direction,
}

impl TargetArgs {
    fn target(&self) -> Matcher {
        Matcher::from_selector(&self.selector, self.label, self.element_type.as_deref())
    }

    fn container(&self) -> Matcher {
        Matcher::from_selector(&self.within, self.within_label, None)
    }

    fn options(&self) -> Result<ScrollOptions, CliError> {
        let mut options = ScrollOptions::default().with_direction(self.direction);
        if let Some(points) = self.distance {
            let distance = ScrollDistance::new(points).map_err(|e| CliError::Usage(e.to_string()))?;
            options = options.with_distance(distance);
        }
        Ok(options)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}

#[derive(Debug)]
enum CliError {
    ActionFailed(HelperError),
    Usage(String),
    Fixture(String),
}

impl CliError {
    fn exit_code(&self) -> ExitCode {
        match self {
            CliError::ActionFailed(_) => ExitCode::from(1),
            CliError::Usage(_) => ExitCode::from(2),
            CliError::Fixture(_) => ExitCode::from(3),
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::ActionFailed(e) => write!(f, "Action failed: {}", e.source),
            CliError::Usage(msg) => write!(f, "{}", msg),
            CliError::Fixture(msg) => write!(f, "Fixture error: {}", msg),
        }
    }
}

fn load_screen(cli: &Cli) -> Result<SimulatedScreen, CliError> {
    let config = match &cli.config {
        Some(path) => ScrolltapConfig::load_from(path),
        None => ScrolltapConfig::load(),
    };
    let mut policy = config.search;
    if let Some(timeout) = cli.timeout {
        policy.timeout_ms = timeout;
    }
    if let Some(max_swipes) = cli.max_swipes {
        policy.max_swipes = max_swipes;
    }
    if cli.non_strict {
        policy.strict = false;
    }
    debug!(?policy, screen = %cli.screen.display(), "loading screen");

    let screen = SimulatedScreen::load(&cli.screen).map_err(|e| match e {
        DriverError::Io(err) => {
            CliError::Fixture(format!("cannot read {}: {}", cli.screen.display(), err))
        }
        other => CliError::Fixture(other.to_string()),
    })?;
    Ok(screen.with_policy(policy))
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let screen = Arc::new(load_screen(&cli)?);
    let helper = ScrollAndTapHelper::new(screen.clone());

    match &cli.command {
        Command::ScrollTo(args) => {
            let (target, within) = (args.target(), args.container());
            let handle = helper
                .scroll_into_view_with(&target, &within, args.options()?)
                .await
                .map_err(CliError::ActionFailed)?;
            report(&cli, "scroll-to", &handle, &screen);
        }
        Command::Tap(args) => {
            let (target, within) = (args.target(), args.container());
            let options = args.options()?.at(SourceLocation::caller());
            let handle = helper
                .scroll_into_view_with(&target, &within, options)
                .await
                .map_err(CliError::ActionFailed)?;
            // Tap the handle we resolved so the report names the tapped copy.
            screen
                .perform(&handle, Gesture::Tap)
                .await
                .map_err(|e| {
                    CliError::ActionFailed(HelperError::new(SourceLocation::caller(), e))
                })?;
            report(&cli, "tap", &handle, &screen);
        }
        Command::ScreenInfo => {
            let tree = screen
                .dump_tree()
                .await
                .map_err(|e| CliError::Fixture(e.to_string()))?;
            let visible: Vec<UIElement> = matcher::find_all(&tree, &Matcher::visible())
                .into_iter()
                .filter(|e| e.identifier.is_some() || e.label.is_some())
                .map(|e| UIElement {
                    children: Vec::new(),
                    ..e
                })
                .collect();
            print_screen_info(&cli, &visible);
        }
    }
    Ok(())
}

fn report(cli: &Cli, action: &str, handle: &ElementHandle, screen: &SimulatedScreen) {
    let element = handle.element();
    match cli.format {
        OutputFormat::Json => {
            let summary = UIElement {
                children: Vec::new(),
                ..element.clone()
            };
            println!(
                "{}",
                serde_json::json!({
                    "success": true,
                    "action": action,
                    "element": summary,
                    "swipes": screen.swipe_count(),
                    "taps": screen.tap_count(),
                })
            );
        }
        OutputFormat::Text => {
            let verb = if action == "tap" { "Tapped" } else { "Scrolled to" };
            println!(
                "{} {} after {} swipe(s)",
                verb,
                element.describe(),
                screen.swipe_count()
            );
        }
    }
}

fn print_screen_info(cli: &Cli, elements: &[UIElement]) {
    match cli.format {
        OutputFormat::Json => {
            println!("{}", serde_json::json!({ "elements": elements }));
        }
        OutputFormat::Text => {
            if elements.is_empty() {
                eprintln!("No visible elements");
            }
            for element in elements {
                let typ = element.element_type.as_deref().unwrap_or("-");
                let label = element.label.as_deref().unwrap_or("");
                println!("{:<24} {:<12} {}", element.describe(), typ, label);
            }
        }
    }
}
