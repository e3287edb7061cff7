//! CLI module - Command-line interface definitions and handlers

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::ai::client::GeminiClient;
use crate::ai::{apply_suggestions, refine_project};
use crate::core::include::flatten;
use crate::core::preview::RenderContext;
use crate::core::resolve::resolve;
use crate::core::tree::{FileNode, FileTree, NodeId};
use crate::project::{self, ProjectState};

/// texpeek - preview LaTeX resume projects as HTML, with AI-assisted refinement.
#[derive(Parser, Debug)]
#[command(name = "texpeek")]
#[command(
    author,
    version,
    about,
    long_about = r#"texpeek renders a best-effort HTML preview of a LaTeX resume project.

The project is loaded wholesale from a directory or a .zip archive; includes
are flattened, images are inlined as data URIs, and a staged rewrite pipeline
degrades the markup into a small display vocabulary. Unknown commands vanish
instead of failing the render.

Examples:
    texpeek --project resume.zip render --out preview.html
    texpeek --project . flatten main.tex
    texpeek --project . refine jd.txt --apply
    texpeek --project . pack --out refined_resume.zip
"#
)]
pub struct Cli {
    /// Project source: a directory or a .zip archive.
    #[arg(
        long,
        global = true,
        default_value = ".",
        value_name = "PATH",
        long_help = "Project source to load: either a directory or a .zip archive.\n\n\
The whole tree is (re)loaded on every invocation; text files are classified\n\
by extension (tex/txt/bib/cls/sty/md/json), everything else stays binary."
    )]
    pub project: PathBuf,

    /// Quiet mode (minimal output).
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (more diagnostics).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the project file tree.
    #[command(
        long_about = "Print the loaded project tree, depth-first, with folders suffixed by '/'\n\
and binary files annotated with their size."
    )]
    Tree,

    /// Expand cross-file includes into one flattened source text.
    #[command(
        long_about = "Expand \\input/\\include directives recursively into a single text.\n\n\
References are tried verbatim and with .tex/.cls/.sty appended; a reference\n\
that resolves to nothing is dropped silently. Cyclic includes flatten to an\n\
empty substitution at the cyclic reference."
    )]
    Flatten {
        /// Entry file reference; defaults to the first .tex file in the tree.
        entry: Option<String>,

        /// Write to FILE instead of stdout.
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },

    /// Render the HTML preview.
    #[command(
        long_about = "Run the full pipeline for the entry file: include flattening, image\n\
inlining, then the markup-to-display passes, wrapped in a self-contained\n\
HTML page with a print trigger. Use --fragment for the bare fragment."
    )]
    Render {
        /// Entry file reference; defaults to the first .tex file in the tree.
        entry: Option<String>,

        /// Write to FILE instead of stdout.
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,

        /// Emit only the display-markup fragment, without the page shell.
        #[arg(long)]
        fragment: bool,
    },

    /// Refine the project sources against a job description.
    #[command(
        long_about = "Send every .tex source plus the job description to the refinement model\n\
and print its advice and per-file suggestions. Nothing is written unless\n\
--apply is given; then accepted suggestions are set into the tree and the\n\
project source (directory or archive) is saved back."
    )]
    Refine {
        /// File holding the job description text.
        job: PathBuf,

        /// Write suggestions back into the project source.
        #[arg(long)]
        apply: bool,

        /// API key for the refinement endpoint.
        #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
        api_key: String,

        /// Model identifier override.
        #[arg(long, value_name = "MODEL")]
        model: Option<String>,
    },

    /// Export the project tree to a zip archive.
    Pack {
        /// Archive file to create.
        #[arg(long, value_name = "FILE")]
        out: PathBuf,
    },

    /// Export the project tree to a directory.
    Unpack {
        /// Directory to write the tree under.
        #[arg(long, value_name = "DIR")]
        out: PathBuf,
    },
}

/// Entry point called from main after argument parsing.
pub fn run(cli: Cli) -> Result<()> {
    init_logger(cli.verbose);

    let tree = project::load(&cli.project)?;
    let mut state = ProjectState::new(tree);

    match cli.command {
        Commands::Tree => run_tree(&state),
        Commands::Flatten { entry, out } => {
            select_entry(&mut state, entry.as_deref())?;
            run_flatten(&state, out.as_deref())
        }
        Commands::Render {
            entry,
            out,
            fragment,
        } => {
            select_entry(&mut state, entry.as_deref())?;
            run_render(&state, out.as_deref(), fragment)
        }
        Commands::Refine {
            job,
            apply,
            api_key,
            model,
        } => run_refine(
            &mut state,
            &cli.project,
            &job,
            apply,
            api_key,
            model,
            cli.quiet,
        ),
        Commands::Pack { out } => {
            project::archive::export(&state.tree, &out)?;
            if !cli.quiet {
                println!("packed {} nodes into '{}'", state.tree.len(), out.display());
            }
            Ok(())
        }
        Commands::Unpack { out } => {
            project::dir::export(&state.tree, &out)?;
            if !cli.quiet {
                println!(
                    "unpacked {} nodes into '{}'",
                    state.tree.len(),
                    out.display()
                );
            }
            Ok(())
        }
    }
}

fn init_logger(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    let _ = env_logger::Builder::from_default_env()
        .filter_level(level)
        .try_init();
}

/// Resolve the entry reference (or fall back to the first .tex file) and
/// mark it active.
fn select_entry(state: &mut ProjectState, entry: Option<&str>) -> Result<()> {
    let path = match entry {
        Some(reference) => resolve(&state.tree, reference)
            .map(|node| node.path.clone())
            .with_context(|| format!("no project file matches '{reference}'"))?,
        None => project::first_tex_file(&state.tree)
            .map(|node| node.path.clone())
            .context("project contains no .tex entry file")?,
    };
    state.set_active(&path);
    Ok(())
}

fn active_entry(state: &ProjectState) -> Result<&FileNode> {
    state.active_file().context("no entry file selected")
}

fn run_tree(state: &ProjectState) -> Result<()> {
    fn print_node(tree: &FileTree, id: NodeId, depth: usize) {
        let Some(node) = tree.get(id) else { return };
        let indent = "  ".repeat(depth);
        if node.is_folder() {
            println!("{indent}{}/", node.name.blue().bold());
        } else {
            match node.bytes() {
                Some(bytes) => println!(
                    "{indent}{} {}",
                    node.name,
                    format!("({} bytes)", bytes.len()).dimmed()
                ),
                None => println!("{indent}{}", node.name),
            }
        }
        for child in &node.children {
            print_node(tree, *child, depth + 1);
        }
    }

    if state.tree.is_empty() {
        println!("{}", "(empty project)".dimmed());
        return Ok(());
    }
    for id in state.tree.roots() {
        print_node(&state.tree, *id, 0);
    }
    Ok(())
}

fn run_flatten(state: &ProjectState, out: Option<&Path>) -> Result<()> {
    let entry = active_entry(state)?;
    let flattened = flatten(&state.tree, entry);
    emit(out, &flattened)
}

fn run_render(state: &ProjectState, out: Option<&Path>, fragment_only: bool) -> Result<()> {
    let entry = active_entry(state)?;
    let ctx = RenderContext::new(&state.tree, entry);
    let output = if fragment_only {
        ctx.fragment()
    } else {
        ctx.page()
    };
    emit(out, &output)
}

fn run_refine(
    state: &mut ProjectState,
    project_path: &Path,
    job: &Path,
    apply: bool,
    api_key: String,
    model: Option<String>,
    quiet: bool,
) -> Result<()> {
    let job_text = fs::read_to_string(job)
        .with_context(|| format!("cannot read job description '{}'", job.display()))?;
    if job_text.trim().is_empty() {
        bail!("job description '{}' is empty", job.display());
    }

    let mut client = GeminiClient::new(api_key);
    if let Some(model) = model {
        client = client.with_model(model);
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("cannot start async runtime")?;
    let response = runtime.block_on(refine_project(&client, &state.tree, &job_text))?;

    if !quiet {
        println!("{}", "General advice".bold());
        println!("{}", response.general_advice);
        for suggestion in &response.suggestions {
            println!();
            println!("{} {}", "*".cyan(), suggestion.file_path.bold());
            println!("  {}", suggestion.explanation);
        }
    }

    if apply {
        let applied = apply_suggestions(&mut state.tree, &response);
        if project_path.is_dir() {
            project::dir::export(&state.tree, project_path)?;
        } else {
            project::archive::export(&state.tree, project_path)?;
        }
        if !quiet {
            println!();
            println!(
                "{} file(s) updated in '{}'",
                applied.len(),
                project_path.display()
            );
        }
    } else if !quiet && !response.suggestions.is_empty() {
        println!();
        println!(
            "run again with --apply to write {} suggestion(s) into the project",
            response.suggestions.len()
        );
    }

    Ok(())
}

/// Write to a file or stdout.
fn emit(out: Option<&Path>, content: &str) -> Result<()> {
    match out {
        Some(path) => {
            fs::write(path, content).with_context(|| format!("cannot write '{}'", path.display()))
        }
        None => {
            print!("{content}");
            Ok(())
        }
    }
}
