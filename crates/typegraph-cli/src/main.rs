use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context as _, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use typegraph::{
    init_tracing, Context, Erasure, StatsSnapshot, TypeFactory, TypeInfo, TypeSystemConfig,
};
use typegraph_reflect::{parse_type, ClassUniverse};

#[derive(Parser)]
#[command(
    name = "typegraph",
    version,
    about = "Inspect generic types of a class universe (supertypes, resolution, members)"
)]
struct Cli {
    /// Class universe JSON file; may be repeated
    #[arg(long = "universe", global = true, value_name = "FILE")]
    universes: Vec<PathBuf>,
    /// Start from an empty universe instead of the bundled JDK subset
    #[arg(long, global = true)]
    no_jdk: bool,
    /// TOML configuration file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Override the configured log level (e.g. `debug`, `typegraph=trace`)
    #[arg(long, global = true, value_name = "DIRECTIVES")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate the class universe and report its size
    Check(CheckArgs),
    /// Print the supertype lattice of a type
    Supertypes(SupertypesArgs),
    /// Resolve a type against a context type
    Resolve(ResolveArgs),
    /// List the members of a class, resolved against a context type
    Members(MembersArgs),
}

#[derive(Args)]
struct CheckArgs {
    /// Emit JSON suitable for CI
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct SupertypesArgs {
    /// Type as a JVM signature (`Ljava/util/List<Ljava/lang/String;>;`) or a
    /// dotted name (`java.lang.String[]`)
    #[arg(value_name = "TYPE")]
    ty: String,
    /// Resolve every supertype against the type itself
    #[arg(long)]
    resolve: bool,
    /// Emit JSON suitable for CI
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ResolveArgs {
    #[arg(value_name = "TYPE")]
    ty: String,
    /// Context type; defaults to no context
    #[arg(long, value_name = "TYPE")]
    context: Option<String>,
    /// Keep type variables the context does not bind instead of falling back
    /// to their bounds
    #[arg(long)]
    no_base_type: bool,
    /// Emit JSON suitable for CI
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct MembersArgs {
    /// Fully qualified class name
    class: String,
    /// Context type; defaults to the class itself
    #[arg(long, value_name = "TYPE")]
    context: Option<String>,
    /// Emit JSON suitable for CI
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            2
        }
    };

    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32> {
    let mut config = match &cli.config {
        Some(path) => TypeSystemConfig::load_from_path(path)?,
        None => TypeSystemConfig::default(),
    };
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config.logging);

    let universe = load_universe(&cli)?;
    let factory = TypeFactory::with_config(Arc::new(universe), config)
        .context("class universe is missing a well-known type")?;

    match cli.command {
        Command::Check(args) => {
            let report = CheckReport {
                classes: factory.universe().len(),
            };
            if args.json {
                print_json(&report)?;
            } else {
                println!("ok: {} classes", report.classes);
            }
        }
        Command::Supertypes(args) => {
            let ty = build_type(&factory, &args.ty)?;
            let supertypes = ty
                .supertypes(&factory)
                .into_iter()
                .map(|supertype| {
                    let shown = if args.resolve {
                        supertype.resolve(&factory, Context::Type(&ty), true)
                    } else {
                        supertype
                    };
                    SupertypeEntry {
                        interface: shown.is_interface(),
                        erasure: shown.erasure().to_string(),
                        ty: shown.to_string(),
                    }
                })
                .collect();
            let report = SupertypesReport {
                ty: ty.to_string(),
                supertypes,
                stats: factory.stats(),
            };
            if args.json {
                print_json(&report)?;
            } else {
                println!("{}", report.ty);
                for entry in &report.supertypes {
                    let kind = if entry.interface { "interface" } else { "class" };
                    println!("  {kind:<9} {}", entry.ty);
                }
            }
        }
        Command::Resolve(args) => {
            let ty = build_type(&factory, &args.ty)?;
            let context_type = args
                .context
                .as_deref()
                .map(|text| build_type(&factory, text))
                .transpose()?;
            let context = context_type.as_ref().map_or(Context::Unbound, Context::Type);
            let resolved = ty.resolve(&factory, context, !args.no_base_type);
            let report = ResolveReport {
                input: ty.to_string(),
                context: context_type.as_ref().map(ToString::to_string),
                include_base_type: !args.no_base_type,
                resolved: resolved.to_string(),
                erasure: resolved.erasure().to_string(),
            };
            if args.json {
                print_json(&report)?;
            } else {
                println!("{}", report.resolved);
            }
        }
        Command::Members(args) => {
            let report = members(&factory, &args)?;
            if args.json {
                print_json(&report)?;
            } else {
                println!("{}", report.context);
                for field in &report.fields {
                    println!("  {field}");
                }
                for member in report.constructors.iter().chain(&report.methods) {
                    println!("  {}", member.display);
                }
            }
        }
    }
    Ok(0)
}

fn load_universe(cli: &Cli) -> Result<ClassUniverse> {
    let mut universe = if cli.no_jdk {
        ClassUniverse::new()
    } else {
        ClassUniverse::with_minimal_jdk()
    };
    for path in &cli.universes {
        let file =
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        universe
            .load_json(file)
            .with_context(|| format!("failed to load {}", path.display()))?;
    }
    universe.validate().context("class universe is inconsistent")?;
    tracing::debug!(
        target = "typegraph.cli",
        classes = universe.len(),
        files = cli.universes.len(),
        "loaded class universe"
    );
    Ok(universe)
}

fn build_type(factory: &TypeFactory, text: &str) -> Result<TypeInfo> {
    let reflected =
        parse_type(factory.universe(), text).with_context(|| format!("invalid type `{text}`"))?;
    let ty = factory
        .try_build(&reflected)
        .with_context(|| format!("invalid type `{text}`"))?;
    Ok(ty)
}

fn members(factory: &TypeFactory, args: &MembersArgs) -> Result<MembersReport> {
    let Some(decl) = factory.universe().class(&args.class).cloned() else {
        bail!("unknown class {}", args.class);
    };
    let class = Erasure::class(decl.name.clone());
    let context = match &args.context {
        Some(text) => build_type(factory, text)?,
        None => build_type(factory, &args.class)?,
    };
    if !factory.universe().is_assignable(&class, &context.erasure()) {
        bail!("{context} is not a subtype of {class}");
    }

    let fields = decl
        .fields
        .iter()
        .map(|field| {
            factory
                .field_info(field)
                .resolve(factory, Context::Type(&context), false)
                .to_string()
        })
        .collect();

    let mut constructors = Vec::new();
    let mut methods = Vec::new();
    for method in &decl.methods {
        let info = factory
            .method_info(method)
            .resolve(factory, Context::Type(&context), false);
        let entry = MemberEntry {
            signature: info.signature().to_string(),
            display: info.to_string(),
            effective_exceptions: info
                .effective_exception_types()
                .iter()
                .map(ToString::to_string)
                .collect(),
        };
        if info.is_constructor() {
            constructors.push(entry);
        } else {
            methods.push(entry);
        }
    }

    Ok(MembersReport {
        class: class.to_string(),
        context: context.to_string(),
        fields,
        constructors,
        methods,
    })
}

#[derive(Serialize)]
struct CheckReport {
    classes: usize,
}

#[derive(Serialize)]
struct SupertypesReport {
    #[serde(rename = "type")]
    ty: String,
    supertypes: Vec<SupertypeEntry>,
    stats: StatsSnapshot,
}

#[derive(Serialize)]
struct SupertypeEntry {
    #[serde(rename = "type")]
    ty: String,
    erasure: String,
    interface: bool,
}

#[derive(Serialize)]
struct ResolveReport {
    input: String,
    context: Option<String>,
    include_base_type: bool,
    resolved: String,
    erasure: String,
}

#[derive(Serialize)]
struct MembersReport {
    class: String,
    context: String,
    fields: Vec<String>,
    constructors: Vec<MemberEntry>,
    methods: Vec<MemberEntry>,
}

#[derive(Serialize)]
struct MemberEntry {
    signature: String,
    display: String,
    effective_exceptions: Vec<String>,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value)?;
    println!("{out}");
    Ok(())
}
