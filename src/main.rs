use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::builder::BoolishValueParser;
use clap::Parser;
use tracing::Level;

use release_plan::cli::{run_release_plan, ReleaseOutcome, ReleaseSources};
use release_plan::config::{self, Overrides};
use release_plan::domain::RunFacts;
use release_plan::sources::{
    FileBumpSource, GitTagHistory, ManualBumpSource, MergeRequestTextSource, StaticTagHistory,
    TagHistorySource,
};
use release_plan::{env, telemetry, ui};

#[derive(clap::Parser)]
#[command(
    name = "release-plan",
    version,
    about = "Decide image tags, next version and publish policy for a CI run"
)]
struct Args {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(long, env = "RELEASE_PLAN_FLOW", help = "Force a flow: auto, feature, mr, default, release")]
    flow: Option<String>,

    #[arg(long, env = "RELEASE_PLAN_BUMP", help = "Force a bump kind: patch, minor, major")]
    bump: Option<String>,

    #[arg(long, help = "Branch prefix marking feature branches")]
    feature_prefix: Option<String>,

    #[arg(long, help = "Application (image) name; defaults to the registry path's last segment")]
    app_name: Option<String>,

    #[arg(long, help = "Use this latest tag instead of reading the tag history")]
    latest_tag: Option<String>,

    #[arg(long, help = "Repository to read tags from [default: current directory]")]
    repo: Option<PathBuf>,

    #[arg(long, help = "File with merge-request text to read a manual bump from")]
    mr_text_file: Option<PathBuf>,

    #[arg(
        long,
        help = "Directory of exported merge-request notes, one file per note, oldest first by name"
    )]
    mr_notes_dir: Option<PathBuf>,

    #[arg(short, long, help = "Write build options JSON to this file")]
    output: Option<PathBuf>,

    #[arg(long, help = "Print build options JSON to stdout")]
    json: bool,

    #[arg(
        long,
        env = "RELEASE_PLAN_PUSH_FEATURE",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new(),
        help = "Publish feature builds on direct push (=false turns it off)"
    )]
    publish_feature: Option<bool>,

    #[arg(
        long,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new(),
        help = "Add `latest` on feature builds"
    )]
    latest_on_feature: Option<bool>,

    #[arg(
        long,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new(),
        help = "Add `latest` on default-branch builds"
    )]
    latest_on_default: Option<bool>,

    #[arg(
        long,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new(),
        help = "Add `latest` on release tag builds"
    )]
    tag_latest: Option<bool>,

    #[arg(
        long,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new(),
        help = "Plan only; the executor must not push"
    )]
    dry_run: Option<bool>,

    #[arg(short, long, help = "Debug-level logging")]
    verbose: bool,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            bump: self.bump.clone(),
            flow: self.flow.clone(),
            feature_prefix: self.feature_prefix.clone(),
            application_name: self.app_name.clone(),
            latest_on_feature: self.latest_on_feature,
            latest_on_default: self.latest_on_default,
            tag_latest: self.tag_latest,
            publish_feature: self.publish_feature,
            dry_run: self.dry_run,
        }
    }
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    telemetry::init_tracing(telemetry::json_requested(), level);

    if let Err(e) = run(&args) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let mut config = config::load_config(args.config.as_deref()).context("loading config")?;
    config.apply_overrides(&args.overrides());

    let facts = RunFacts::from_env(&config);

    let tag_history: Box<dyn TagHistorySource> = if args.latest_tag.is_some() {
        Box::new(StaticTagHistory::default())
    } else {
        let path = args.repo.clone().unwrap_or_else(|| PathBuf::from("."));
        match GitTagHistory::open(&path) {
            Ok(history) => Box::new(history),
            Err(e) => {
                tracing::warn!(event = "lookup.unavailable", lookup = "tag-history", error = %e);
                Box::new(StaticTagHistory::unavailable(e.to_string()))
            }
        }
    };

    let manual_bump = manual_bump_source(args);

    let sources = ReleaseSources {
        tag_history: tag_history.as_ref(),
        manual_bump: Some(manual_bump.as_ref()),
        latest_tag: args.latest_tag.clone(),
    };

    let outcome = run_release_plan(facts, &config, &sources)?;
    report(&outcome);
    write_build_options(args, &outcome)
}

fn manual_bump_source(args: &Args) -> Box<dyn ManualBumpSource> {
    let description = env::merge_request_description();
    if args.mr_text_file.is_none() && args.mr_notes_dir.is_none() {
        return Box::new(MergeRequestTextSource::new(description));
    }

    let mut source = FileBumpSource::default().with_inline_description(description);
    if let Some(path) = &args.mr_text_file {
        source = source.with_description_file(path);
    }
    if let Some(dir) = &args.mr_notes_dir {
        source = source.with_notes_dir(dir);
    }
    Box::new(source)
}

fn report(outcome: &ReleaseOutcome) {
    for warning in &outcome.warnings {
        ui::display_boundary_warning(warning);
    }
    ui::display_summary(outcome);
    ui::display_success(&format!(
        "Planned {} image ref(s) for {}",
        outcome.plan.refs.len(),
        ui::describe_context(&outcome.context)
    ));
}

fn write_build_options(args: &Args, outcome: &ReleaseOutcome) -> Result<()> {
    let json = outcome.build_options.to_json()?;

    if let Some(path) = &args.output {
        fs::write(path, &json)
            .with_context(|| format!("writing build options to {}", path.display()))?;
        ui::display_status(&format!("Build options written to {}", path.display()));
    }
    if args.json {
        println!("{}", json);
    }
    Ok(())
}
