use anyhow::Context;
use ballista_engine::collect::PigmentCollector;
use ballista_engine::color::Color;
use ballista_engine::config::{EngineConfig, DEFAULT_MASS};
use ballista_engine::dispatch::{Dispatcher, RetryPolicy, SuccessCode};
use ballista_engine::inventory::ColorInventory;
use ballista_engine::planner::{Grid, ImagePlanner};
use ballista_engine::remote::Remote;
use ballista_engine::shutdown::{self, Shutdown};
use ballista_engine::trajectory::{DEFAULT_STANDOFF, STANDARD_GRAVITY};
use ballista_tools::{fetch_grid, HttpRemote, DEFAULT_BASE_URL};
use clap::{Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use std::time::Duration;

#[derive(Parser, Debug)]
#[clap(about = "Paints images on the art game canvas with the ballista")]
struct Arguments {
    #[clap(long, env = "BALLISTA_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    #[clap(long, env = "TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Status code the API uses to acknowledge a shot (200, or 20 on newer versions).
    #[clap(long, default_value_t = SuccessCode::HTTP_OK.0)]
    success_code: i64,

    #[clap(long, default_value_t = 100)]
    retry_interval_ms: u64,

    /// Multiply the retry delay by this factor after every rejection.
    #[clap(long)]
    retry_backoff: Option<u64>,

    /// Give up on a shot after this many attempts. Unlimited by default.
    #[clap(long)]
    max_attempts: Option<u32>,

    /// Give up on a shot after this many seconds. Unlimited by default.
    #[clap(long)]
    deadline_secs: Option<u64>,

    #[clap(long, default_value_t = DEFAULT_STANDOFF)]
    standoff: f64,

    #[clap(long, default_value_t = STANDARD_GRAVITY)]
    gravity: f64,

    #[clap(long, default_value_t = DEFAULT_MASS)]
    mass: f64,

    #[clap(long, default_value_t = 1.0)]
    power_scale: f64,

    #[clap(subcommand)]
    cmd: SubCommand,
}

#[derive(Subcommand, Debug)]
enum SubCommand {
    /// Paint a whole image. Defaults to the current stage's canvas.
    Paint { url: Option<String> },
    /// Fire a single cell of the image.
    TestShot {
        x: usize,
        y: usize,
        url: Option<String>,
        /// Poll the command queue until the shot has been processed.
        #[clap(long)]
        wait: bool,
    },
    /// Keep claiming freshly generated pigment until interrupted.
    Collect {
        #[clap(long, default_value_t = 0)]
        pause_ms: u64,
    },
    StageNext,
    StageInfo,
    /// Count the colors an image needs and compare against stock.
    Census { url: Option<String> },
}

impl Arguments {
    fn engine_config(&self) -> EngineConfig {
        let interval = Duration::from_millis(self.retry_interval_ms);
        EngineConfig {
            standoff: self.standoff,
            gravity: self.gravity,
            mass: self.mass,
            success: SuccessCode(self.success_code),
            retry: RetryPolicy {
                interval,
                backoff: self.retry_backoff,
                max_attempts: self.max_attempts,
                deadline: self.deadline_secs.map(Duration::from_secs),
                ..Default::default()
            },
            power_scale: self.power_scale,
        }
    }

    fn remote(&self, http: &reqwest::Client) -> anyhow::Result<HttpRemote> {
        let token = self
            .token
            .as_deref()
            .context("missing TOKEN environment variable")?;
        Ok(HttpRemote::new(http.clone(), &self.base_url, token))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("ballista=info"))
        .init();

    let args = Arguments::parse();
    let http = reqwest::Client::new();

    let (handle, shutdown) = shutdown::channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, stopping");
            handle.trigger();
        }
    });

    match &args.cmd {
        SubCommand::Paint { url } => cmd_paint(&args, &http, url.clone(), shutdown).await,
        SubCommand::TestShot { x, y, url, wait } => {
            cmd_test_shot(&args, &http, *x, *y, url.clone(), *wait, shutdown).await
        }
        SubCommand::Collect { pause_ms } => cmd_collect(&args, &http, *pause_ms, shutdown).await,
        SubCommand::StageNext => {
            let stage = args.remote(&http)?.stage_next().await?;
            println!("{}", serde_json::to_string_pretty(&stage)?);
            Ok(())
        }
        SubCommand::StageInfo => {
            println!("{}", args.remote(&http)?.stage_info().await?);
            Ok(())
        }
        SubCommand::Census { url } => cmd_census(&args, &http, url.clone()).await,
    }
}

async fn load_image(
    remote: &HttpRemote,
    http: &reqwest::Client,
    url: Option<String>,
) -> anyhow::Result<Grid> {
    let url = match url {
        Some(url) => url,
        None => remote.stage_info().await?,
    };
    fetch_grid(http, &url).await
}

async fn load_inventory(remote: &HttpRemote) -> anyhow::Result<ColorInventory> {
    let inventory = ColorInventory::from_wire(&remote.colors().await?)?;
    log::info!(
        "Loaded {} colors, {} units",
        inventory.len(),
        inventory.total_units()
    );
    Ok(inventory)
}

fn planner<'a>(
    args: &Arguments,
    remote: &'a HttpRemote,
    shutdown: Shutdown,
) -> ImagePlanner<ballista_engine::OptimalArcSolver, &'a HttpRemote> {
    let config = args.engine_config();
    let dispatcher = Dispatcher::new(remote, config.success, config.retry.clone(), shutdown)
        .with_power_scale(config.power_scale);
    ImagePlanner::new(config.solver(), config.mass, dispatcher)
}

async fn cmd_paint(
    args: &Arguments,
    http: &reqwest::Client,
    url: Option<String>,
    shutdown: Shutdown,
) -> anyhow::Result<()> {
    let remote = args.remote(http)?;
    let grid = load_image(&remote, http, url).await?;
    let mut inventory = load_inventory(&remote).await?;
    let report = planner(args, &remote, shutdown)
        .paint(&grid, &mut inventory)
        .await?;
    println!(
        "Fired {} shots, skipped {} background cells, {} units left",
        report.shots,
        report.skipped,
        inventory.total_units()
    );
    Ok(())
}

async fn cmd_test_shot(
    args: &Arguments,
    http: &reqwest::Client,
    x: usize,
    y: usize,
    url: Option<String>,
    wait: bool,
    shutdown: Shutdown,
) -> anyhow::Result<()> {
    let remote = args.remote(http)?;
    let grid = load_image(&remote, http, url).await?;
    let mut inventory = load_inventory(&remote).await?;
    let planner = planner(args, &remote, shutdown);
    let id = planner.paint_cell(&grid, x, y, &mut inventory).await?;
    match (id, wait) {
        (Some(id), true) => {
            let ok = planner.dispatcher().wait_for_completion(id).await?;
            println!("Shot {id} processed, success: {ok}");
        }
        (Some(id), false) => println!("Shot {id} queued"),
        (None, _) => println!("Shot acknowledged"),
    }
    Ok(())
}

async fn cmd_collect(
    args: &Arguments,
    http: &reqwest::Client,
    pause_ms: u64,
    shutdown: Shutdown,
) -> anyhow::Result<()> {
    let remote = args.remote(http)?;
    let stats = PigmentCollector::new(&remote, rand::thread_rng(), shutdown)
        .with_pause(Duration::from_millis(pause_ms))
        .run()
        .await?;
    println!(
        "Collected {} units in {} rounds",
        stats.picked, stats.rounds
    );
    Ok(())
}

async fn cmd_census(
    args: &Arguments,
    http: &reqwest::Client,
    url: Option<String>,
) -> anyhow::Result<()> {
    let (grid, inventory) = match (&url, args.remote(http)) {
        (Some(url), Err(_)) => (fetch_grid(http, url).await?, None),
        (_, remote) => {
            let remote = remote?;
            let grid = load_image(&remote, http, url.clone()).await?;
            (grid, Some(load_inventory(&remote).await?))
        }
    };

    let mut census: Vec<(Color, u64)> = grid
        .census()
        .into_iter()
        .filter(|(color, _)| !color.rgb().is_white())
        .collect();
    census.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Color", "RGB", "Cells", "Nearest", "Stock"]);
    for (color, cells) in &census {
        let rgb = color.rgb();
        let (nearest, stock) = match inventory
            .as_ref()
            .and_then(|inventory| inventory.nearest_color(rgb).ok().map(|c| (inventory, c)))
        {
            Some((inventory, nearest)) => (
                nearest.to_string(),
                inventory.remaining(nearest).unwrap_or(0).to_string(),
            ),
            None => ("-".to_string(), "-".to_string()),
        };
        table.add_row(vec![
            color.to_string(),
            format!("({}, {}, {})", rgb.r, rgb.g, rgb.b),
            cells.to_string(),
            nearest,
            stock,
        ]);
    }

    println!("{}x{} image, {} colors", grid.width(), grid.height(), census.len());
    println!("{table}");
    Ok(())
}
