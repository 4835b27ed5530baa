//! Scope DSL CLI entry point.

use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use scopedsl_engine::EngineConfig;
use scopedsl_foundation::QualifiedId;
use scopedsl_runtime::{Repl, Session};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `scopedsl_engine=debug`.
const LOG_ENV: &str = "SCOPEDSL_LOG";

/// CLI configuration parsed from arguments.
#[derive(Default)]
struct CliConfig {
    files: Vec<PathBuf>,
    world: Option<PathBuf>,
    actor: Option<String>,
    bindings: Vec<(String, String)>,
    evals: Vec<String>,
    queries: Vec<String>,
    batch_mode: bool,
    check: bool,
    strict: bool,
    show_help: bool,
    show_version: bool,
    trace: bool,
}

impl CliConfig {
    /// Evaluations and checks run once and exit.
    fn is_batch(&self) -> bool {
        self.batch_mode || self.check || !self.evals.is_empty() || !self.queries.is_empty()
    }
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("\x1b[31mError: {e}\x1b[0m");
            ExitCode::FAILURE
        }
    }
}

fn parse_args(args: Vec<String>) -> Result<CliConfig, Box<dyn std::error::Error>> {
    let mut config = CliConfig::default();
    let mut args = args.into_iter().skip(1);

    while let Some(arg) = args.next() {
        let mut value = |flag: &str| {
            args.next()
                .ok_or_else(|| format!("{flag} requires a value"))
        };
        match arg.as_str() {
            "-h" | "--help" => config.show_help = true,
            "-V" | "--version" => config.show_version = true,
            "-b" | "--batch" => config.batch_mode = true,
            "-c" | "--check" => config.check = true,
            "--strict" => config.strict = true,
            "--trace" => config.trace = true,
            "-w" | "--world" => config.world = Some(PathBuf::from(value(&arg)?)),
            "-a" | "--actor" => config.actor = Some(value(&arg)?),
            "-e" | "--eval" => config.evals.push(value(&arg)?),
            "-q" | "--query" => config.queries.push(value(&arg)?),
            "--bind" => {
                let binding = value(&arg)?;
                let (name, raw) = binding
                    .split_once('=')
                    .ok_or_else(|| format!("--bind expects name=value, got `{binding}`"))?;
                config.bindings.push((name.to_string(), raw.to_string()));
            }
            flag if flag.starts_with('-') => {
                return Err(format!("unknown option: {flag}").into());
            }
            path => config.files.push(PathBuf::from(path)),
        }
    }

    Ok(config)
}

fn init_logging(trace: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    if trace {
        filter = filter
            .add_directive("scopedsl_engine=debug".parse()?)
            .add_directive("scopedsl_runtime=debug".parse()?);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    Ok(())
}

fn run(args: Vec<String>) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = parse_args(args)?;

    if config.show_help {
        print_help();
        return Ok(ExitCode::SUCCESS);
    }

    if config.show_version {
        println!("scopedsl {}", env!("CARGO_PKG_VERSION"));
        return Ok(ExitCode::SUCCESS);
    }

    init_logging(config.trace)?;

    let engine_config = if config.strict {
        EngineConfig::new()
    } else {
        EngineConfig::tooling()
    };
    let mut repl = Repl::new()?.with_session(Session::with_config(engine_config));

    if let Some(actor) = &config.actor {
        repl.session_mut().set_actor(actor.as_str());
    }
    for (name, raw) in &config.bindings {
        repl.eval(&format!(":bind {name} {raw}"))?;
    }

    // Load worlds and scope files
    let mut load_errors = 0;
    if let Some(world) = &config.world {
        load_world(&mut repl, world)?;
    }
    for file in &config.files {
        if is_json(file) {
            load_world(&mut repl, file)?;
        } else {
            let report = repl.load_file(&file.display().to_string())?;
            load_errors += report.errors.len();
            eprintln!(
                "loaded {} scope(s) from {}",
                report.registered.len(),
                file.display()
            );
        }
    }

    if config.check {
        let unresolved = repl.session().engine().registry().unresolved();
        for (scope, missing) in &unresolved {
            eprintln!("\x1b[33mwarning: {scope} references unknown scope {missing}\x1b[0m");
        }
        let failed = load_errors > 0 || (config.strict && !unresolved.is_empty());
        eprintln!(
            "{} scope(s), {load_errors} error(s), {} unresolved reference(s)",
            repl.session().engine().registry().len(),
            unresolved.len()
        );
        if failed {
            return Ok(ExitCode::FAILURE);
        }
    }

    let mut failed = false;
    for key in &config.evals {
        let key = QualifiedId::parse(key).ok_or_else(|| format!("expected mod:scope, got `{key}`"))?;
        failed |= print_result(&key.to_string(), repl.session().evaluate(&key));
    }
    for source in &config.queries {
        failed |= print_result(source, repl.session().query(source));
    }

    if config.is_batch() {
        return Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS });
    }

    // Run interactive REPL
    // If files were loaded, suppress banner since context is established
    if !config.files.is_empty() || config.world.is_some() {
        repl = repl.without_banner();
    }

    repl.run()?;
    Ok(ExitCode::SUCCESS)
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn load_world<E: scopedsl_runtime::LineEditor>(
    repl: &mut Repl<E>,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let count = repl.session_mut().load_world(&path.display().to_string())?;
    eprintln!("loaded {count} entities from {}", path.display());
    Ok(())
}

/// Prints one evaluation result, returning true on failure.
fn print_result(
    label: &str,
    result: scopedsl_foundation::Result<scopedsl_foundation::EntitySet>,
) -> bool {
    match result {
        Ok(entities) => {
            println!("\x1b[1m{label}\x1b[0m ({})", entities.len());
            for entity in entities {
                println!("  {entity}");
            }
            false
        }
        Err(e) => {
            eprintln!("\x1b[31m{label}: {e}\x1b[0m");
            true
        }
    }
}

fn print_help() {
    println!(
        "\x1b[1mscopedsl\x1b[0m - Load, check and query Scope DSL definitions

\x1b[1mUSAGE:\x1b[0m
    scopedsl [OPTIONS] [FILES...]

\x1b[1mARGUMENTS:\x1b[0m
    [FILES...]    Scope files to load; `.json` files are loaded as worlds

\x1b[1mOPTIONS:\x1b[0m
    -h, --help               Print help information
    -V, --version            Print version information
    -b, --batch              Load files and exit (no REPL)
    -c, --check              Validate files and exit non-zero on errors
    -w, --world FILE         Load a JSON world
    -a, --actor ID           Run queries as this entity (default core:player)
    -e, --eval MOD:SCOPE     Evaluate a scope and print it (repeatable)
    -q, --query EXPR         Evaluate an expression and print it (repeatable)
    --bind NAME=VALUE        Bind a context variable (JSON or bare string)
    --strict                 Unknown scope references are errors

\x1b[1mLOGGING:\x1b[0m
    --trace                  Log scope loading and resolution at debug level
    {LOG_ENV}=<filter>      Log filter, e.g. scopedsl_engine=debug (default warn)

\x1b[1mEXAMPLES:\x1b[0m
    scopedsl                                  Start interactive REPL
    scopedsl mods/intimacy/*.scope world.json Load scopes and a world, then start REPL
    scopedsl --check --strict mods/**/*.scope Validate a mod set
    scopedsl -w world.json -e intimacy:close_actors core.scope

Type :help inside the REPL for its commands."
    );
}
