//! Layout Intent CLI
//!
//! Usage:
//!   layout-intent [OPTIONS] <COMMAND>
//!
//! Commands:
//!   detect  Print the constraints detected in a scene
//!   check   Check a constraint list against a scene
//!   diff    Diff constraints across an edit of one object
//!   solve   Repair constraints by moving unpinned objects
//!
//! Options:
//!   -c, --config <FILE>  Detector configuration (TOML, `[detector]` table)
//!   -v, --verbose        Raise log level (repeat for more)
//!   -h, --help           Print help

use std::fmt::Display;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};

use layout_intent::layout::{dangling_references, find_similar};
use layout_intent::{
    compute_constraint_diff_with_config, detect_constraints_with_config, index_objects,
    is_constraint_satisfied, load_constraints, quick_solve, solve, CassowaryFallback,
    Constraint, DetectorConfig, Scene,
};

#[derive(Parser)]
#[command(name = "layout-intent")]
#[command(about = "Infer, check and repair layout constraints between rectangles")]
struct Cli {
    /// Detector configuration file (TOML format)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Raise log level: -v for debug, -vv for trace
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the constraints detected in a scene as JSON
    Detect {
        /// Scene file (.json or .toml)
        scene: PathBuf,
    },

    /// Check each constraint in a list against a scene
    Check {
        /// Scene file (.json or .toml)
        scene: PathBuf,

        /// Constraint list (.json array or .toml `[[constraints]]`)
        #[arg(long)]
        constraints: PathBuf,
    },

    /// Detect constraints on BEFORE and diff them against AFTER
    Diff {
        before: PathBuf,
        after: PathBuf,

        /// Id of the object that moved between the two scenes
        #[arg(long)]
        moved: String,
    },

    /// Repair constraints by moving objects that are not pinned
    Solve {
        /// Scene file (.json or .toml)
        scene: PathBuf,

        /// Constraint list; detected from the scene when omitted
        #[arg(long)]
        constraints: Option<PathBuf>,

        /// Additional objects to pin
        #[arg(long = "fixed", value_name = "ID")]
        fixed: Vec<String>,

        /// Only run the deterministic quick-solver; prints null when it declines
        #[arg(long)]
        quick_only: bool,

        /// Print the repositioned scene instead of the solve result
        #[arg(long)]
        apply: bool,
    },
}

#[derive(Serialize)]
struct Verdict<'a> {
    description: String,
    satisfied: bool,
    constraint: &'a Constraint,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => or_exit(DetectorConfig::from_file(path), || {
            format!("Error loading config '{}'", path.display())
        }),
        None => DetectorConfig::default(),
    };

    match cli.command {
        Command::Detect { scene } => {
            let scene = read_scene(&scene);
            let constraints = detect_constraints_with_config(&scene.objects, &config);
            print_json(&constraints);
        }

        Command::Check { scene, constraints } => {
            let scene = read_scene(&scene);
            let constraints = read_constraints(&constraints);
            let by_id = index_objects(&scene.objects);
            warn_dangling(&constraints, &scene);

            let verdicts: Vec<Verdict> = constraints
                .iter()
                .map(|c| Verdict {
                    description: c.to_string(),
                    satisfied: is_constraint_satisfied(c, &by_id),
                    constraint: c,
                })
                .collect();
            print_json(&verdicts);
        }

        Command::Diff {
            before,
            after,
            moved,
        } => {
            let before = read_scene(&before);
            let after = read_scene(&after);
            let before_constraints = detect_constraints_with_config(&before.objects, &config);
            let diff = compute_constraint_diff_with_config(
                &before_constraints,
                &after.objects,
                &moved,
                &config,
            );
            print_json(&diff);
        }

        Command::Solve {
            scene,
            constraints,
            fixed,
            quick_only,
            apply,
        } => {
            let scene = read_scene(&scene).with_fixed(fixed);
            or_exit(scene.validate(), || "Error in scene".to_string());

            let constraints = match &constraints {
                Some(path) => read_constraints(path),
                None => detect_constraints_with_config(&scene.objects, &config),
            };
            warn_dangling(&constraints, &scene);

            let fixed_ids = scene.fixed_ids();
            let result = if quick_only {
                quick_solve(&constraints, &scene.objects, &fixed_ids)
            } else {
                let outcome = or_exit(
                    solve(&constraints, &scene.objects, &fixed_ids, &CassowaryFallback),
                    || "Error solving constraints".to_string(),
                );
                info!(method = ?outcome.method, score = outcome.result.score, "solved");
                Some(outcome.result)
            };

            match (apply, result) {
                (true, Some(result)) => print_json(&scene.apply(&result.adjustments)),
                (true, None) => print_json(&scene),
                (false, result) => print_json(&result),
            }
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "layout_intent=warn",
        1 => "layout_intent=debug",
        _ => "layout_intent=trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn read_scene(path: &Path) -> Scene {
    or_exit(Scene::from_file(path), || {
        format!("Error reading scene '{}'", path.display())
    })
}

fn read_constraints(path: &Path) -> Vec<Constraint> {
    or_exit(load_constraints(path), || {
        format!("Error reading constraints '{}'", path.display())
    })
}

fn warn_dangling(constraints: &[Constraint], scene: &Scene) {
    let by_id = index_objects(&scene.objects);
    for id in dangling_references(constraints, &by_id) {
        let suggestions = find_similar(by_id.keys().map(String::as_str), id, 2);
        if suggestions.is_empty() {
            warn!(id, "constraint references an object that is not in the scene");
        } else {
            warn!(
                id,
                did_you_mean = %suggestions.join(", "),
                "constraint references an object that is not in the scene"
            );
        }
    }
}

fn print_json<T: Serialize>(value: &T) {
    let json = or_exit(serde_json::to_string_pretty(value), || {
        "Error serializing output".to_string()
    });
    println!("{}", json);
}

fn or_exit<T, E: Display>(result: Result<T, E>, context: impl FnOnce() -> String) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            eprintln!("{}: {}", context(), e);
            std::process::exit(1);
        }
    }
}
