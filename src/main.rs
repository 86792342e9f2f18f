use clap::{Parser, Subcommand};

use mergetron::cleanup::CleanupReport;
use mergetron::config::{Config, TEST_COMMAND_ENV};
use mergetron::git::Git;
use mergetron::{mlog, mlog_debug, mlog_error, Result, Review, TestOutcome, Workflow};

/// Merge branches by hand, review the combined diff, run tests, push.
#[derive(Parser, Debug)]
#[command(name = "git-mergetron")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    MERGETRON_DEBUG=1|trace    Enable debug (or trace) logging\n    MERGETRON_TEST_COMMAND     Command run by the test hook")]
pub struct Cli {
    /// Enable debug logging (writes to ~/.mergetron/mergetron.log)
    #[arg(short = 'd', long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Begin a manual merge of branches
    Merge {
        /// Branches to pull, as <remote>/<branch>
        #[arg(required = true, value_name = "BRANCHES")]
        branches: Vec<String>,
    },

    /// Reopen the diff against the savepoint and rerun the tests
    Review,

    /// Finish the merge: drop the savepoint, push, clean up branches
    Complete,

    #[command(external_subcommand)]
    External(Vec<String>),
}

fn main() {
    let cli = Cli::parse();
    mergetron::log::init_with_debug(cli.debug, starts_new_log(&cli.command));

    if let Err(e) = run(cli.command) {
        mlog_error!("{}", e);
        eprintln!("git-mergetron: {}", e);
        std::process::exit(1);
    }
}

/// Only `merge` begins a new session; later steps append to its log.
fn starts_new_log(command: &Command) -> bool {
    matches!(command, Command::Merge { .. })
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Merge { branches } => run_merge(&branches),
        Command::Review => run_review(),
        Command::Complete => run_complete(),
        Command::External(args) => {
            mlog_debug!("Ignoring unknown subcommand: {:?}", args);
            Ok(())
        }
    }
}

/// Load configuration and move to the repository top level.
fn open_workflow() -> Result<Workflow> {
    let config = Config::load()?;
    let git = Git::discover(&std::env::current_dir()?)?.with_echo(true);
    std::env::set_current_dir(git.root())?;
    Ok(Workflow::new(git, config))
}

fn run_merge(branches: &[String]) -> Result<()> {
    mlog!("Merge command: branches={:?}", branches);
    let workflow = open_workflow()?;
    let review = workflow.merge(branches)?;

    println!();
    println!("Merged {} branch(es) on top of '{}'.", branches.len(), workflow.savepoint());
    print_review(&review);
    println!();
    println!("Next steps:");
    println!("  • Look again:    git-mergetron review");
    println!("  • Finish up:     git-mergetron complete");
    println!("  • Start over:    git reset --hard {}", workflow.savepoint());
    Ok(())
}

fn run_review() -> Result<()> {
    mlog!("Review command");
    let workflow = open_workflow()?;
    let review = workflow.review()?;
    print_review(&review);
    Ok(())
}

fn run_complete() -> Result<()> {
    mlog!("Complete command");
    let workflow = open_workflow()?;
    let report = workflow.complete()?;

    println!();
    println!("\x1b[32mMerge completed.\x1b[0m");
    print_cleanup(&report);
    Ok(())
}

fn print_review(review: &Review) {
    println!("  Difftool:  {}", review.difftool);
    match review.tests {
        TestOutcome::Passed => println!("  Tests:     \x1b[32mpassed\x1b[0m"),
        TestOutcome::Unimplemented => println!(
            "  Tests:     not configured (set test_command or {})",
            TEST_COMMAND_ENV
        ),
    }
}

fn print_cleanup(report: &CleanupReport) {
    if report.skipped {
        println!("  Branch cleanup disabled.");
        return;
    }
    if !report.deleted.is_empty() {
        println!("  Cleaned:");
        for branch in &report.deleted {
            println!("    • {}", branch);
        }
    }
    if !report.failed.is_empty() {
        println!("  \x1b[31mCould not delete:\x1b[0m");
        for (branch, reason) in &report.failed {
            println!("    • {}: {}", branch, reason);
        }
    }
    if !report.local_only.is_empty() {
        println!("  These branches were merged, but don't have a corresponding upstream branch:");
        for branch in &report.local_only {
            println!("    • {}", branch);
        }
    }
    if !report.pruned_remotes.is_empty() {
        println!("  Pruned remotes: {}", report.pruned_remotes.join(", "));
    }
}
