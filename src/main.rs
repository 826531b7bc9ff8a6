use anyhow::Result;
use clap::{Parser, Subcommand};

use gitflow::build::MavenBuild;
use gitflow::config;
use gitflow::git::Git2Repository;
use gitflow::logging;
use gitflow::ui::{Reporter, TerminalReporter};
use gitflow::workflow::{self, GoalParams, Workflow};
use gitflow::GitFlowError;

#[derive(Parser)]
#[command(
    name = "gitflow",
    version,
    about = "Branching workflow with version management for Maven projects"
)]
struct Args {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(short, long, global = true, help = "Show debug output")]
    verbose: bool,

    #[arg(
        short = 'D',
        value_name = "KEY=VALUE",
        global = true,
        help = "Override a property, e.g. -Dflow.installProject=false"
    )]
    define: Vec<String>,

    #[command(subcommand)]
    goal: Goal,
}

#[derive(Subcommand, Debug)]
enum Goal {
    /// Start a feature branch from the development branch
    FeatureStart { name: String },
    /// Rebase the current feature branch onto the development branch
    FeatureRebase,
    /// Merge the current feature branch into the development branch
    FeatureFinish,
    /// Start an epic branch from the development branch
    EpicStart { name: String },
    /// Merge the development branch into the current epic branch
    EpicUpdate,
    /// Merge the current epic branch into the development branch
    EpicFinish,
    /// Start a maintenance branch
    MaintenanceStart {
        name: String,
        #[arg(long, help = "Branch or tag to start from [default: production branch]")]
        base: Option<String>,
        #[arg(long)]
        version: Option<String>,
    },
    /// Start a release branch
    ReleaseStart {
        #[arg(long)]
        version: Option<String>,
    },
    /// Merge and tag the current release branch
    ReleaseFinish,
    /// Start a hotfix branch
    HotfixStart {
        #[arg(long)]
        version: Option<String>,
    },
    /// Merge and tag the current hotfix branch
    HotfixFinish,
    /// Set the version of the current branch
    SetVersion { version: String },
    /// Move the version to another storage: none, file, config or tags
    MakeVersionless { mode: String },
    /// Stamp a build identifier onto the version without committing
    BuildVersion { build_id: String },
    #[command(hide = true)]
    FeatureIntegrate,
    #[command(hide = true)]
    EpicRebase,
}

impl Goal {
    /// Goal name as typed on the command line and the goal's parameters
    fn into_params(self) -> (&'static str, GoalParams) {
        let mut params = GoalParams::default();
        let name = match self {
            Goal::FeatureStart { name } => {
                params.name = Some(name);
                "feature-start"
            }
            Goal::FeatureRebase => "feature-rebase",
            Goal::FeatureFinish => "feature-finish",
            Goal::EpicStart { name } => {
                params.name = Some(name);
                "epic-start"
            }
            Goal::EpicUpdate => "epic-update",
            Goal::EpicFinish => "epic-finish",
            Goal::MaintenanceStart {
                name,
                base,
                version,
            } => {
                params.name = Some(name);
                params.base = base;
                params.version = version;
                "maintenance-start"
            }
            Goal::ReleaseStart { version } => {
                params.version = version;
                "release-start"
            }
            Goal::ReleaseFinish => "release-finish",
            Goal::HotfixStart { version } => {
                params.version = version;
                "hotfix-start"
            }
            Goal::HotfixFinish => "hotfix-finish",
            Goal::SetVersion { version } => {
                params.version = Some(version);
                "set-version"
            }
            Goal::MakeVersionless { mode } => {
                params.mode = Some(mode);
                "make-versionless"
            }
            Goal::BuildVersion { build_id } => {
                params.build_id = Some(build_id);
                "build-version"
            }
            Goal::FeatureIntegrate => "feature-integrate",
            Goal::EpicRebase => "epic-rebase",
        };
        (name, params)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_logging(args.verbose);

    let reporter = TerminalReporter;

    if let Err(e) = run(args, &reporter) {
        match e.downcast_ref::<GitFlowError>().and_then(GitFlowError::failure_info) {
            Some(info) => reporter.failure(info),
            None => reporter.error(&format!("{:#}", e)),
        }
        std::process::exit(1);
    }

    Ok(())
}

fn run(args: Args, reporter: &dyn Reporter) -> Result<()> {
    let mut config = config::load_config(args.config.as_deref())?;
    config.apply_definitions(&args.define)?;

    let repo = Git2Repository::open(".")?;
    let build = MavenBuild::from_config(&config.build);
    let workflow = Workflow::new(&repo, &build, &config, reporter);

    let (goal, params) = args.goal.into_params();
    let result = workflow::run_goal_by_name(&workflow, goal, &params)?;

    if result.resumed {
        tracing::debug!(goal, "goal completed after resuming");
    }
    Ok(())
}
