use std::{process, sync::Arc};

use clap::Parser;
use log::{error, info};

use object_explorer::{
    ArrayObject, AtMostOnce, Chain, ChainPredicate, ENUM, Explorer,
    ExplorerCreateInfo, Features, FieldFlags, FieldInfo, Filtered, I32, I64,
    Instance, Instrumentation, LayoutSizer, NotEnumOrType, OBJECT,
    ObjectVisitor, Traversal, TypeInfo, U8_ARRAY, Value, instrumentation,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(long, default_value_t = 3, help = "Files in the sample folder")]
    files: usize,

    #[arg(long, help = "Also report null fields and elements")]
    visit_nulls: bool,

    #[arg(long, help = "Also report primitive fields and elements")]
    visit_primitives: bool,

    #[arg(long, help = "Explore every object at most once")]
    once: bool,

    #[arg(long, help = "Do not expand enum constants or type descriptors")]
    skip_enums_and_types: bool,

    #[arg(long, requires = "once", help = "Link every inode to its folder")]
    cycles: bool,

    #[arg(long, help = "Estimate the shallow size of every object")]
    footprint: bool,
}

static PERMISSION: TypeInfo = TypeInfo::class("Permission", &ENUM, &[]);

static INODE_FIELDS: [FieldInfo; 3] = [
    FieldInfo::new("permission", &PERMISSION),
    FieldInfo::with_flags("parent", &FOLDER, FieldFlags::PRIVATE),
    FieldInfo::with_flags("COUNT", &I32, FieldFlags::STATIC),
];
static INODE: TypeInfo = TypeInfo::class("Inode", &OBJECT, &INODE_FIELDS);
static INODE_ARRAY: TypeInfo = TypeInfo::array("[Inode]", &INODE);

static FOLDER_FIELDS: [FieldInfo; 1] =
    [FieldInfo::new("contents", &INODE_ARRAY)];
static FOLDER: TypeInfo = TypeInfo::class("Folder", &INODE, &FOLDER_FIELDS);

static FILE_FIELDS: [FieldInfo; 2] = [
    FieldInfo::new("contents", &U8_ARRAY),
    FieldInfo::new("created", &I64),
];
static FILE: TypeInfo = TypeInfo::class("File", &INODE, &FILE_FIELDS);

/// A folder holding `files` files and a subfolder that shares the first
/// file. Every inode carries one of two shared enum constants.
fn sample_tree(files: usize, cycles: bool) -> object_explorer::Result<Value> {
    let read_only = Instance::new(&PERMISSION)?;
    read_only.set("ordinal", 0)?;
    let read_write = Instance::new(&PERMISSION)?;
    read_write.set("ordinal", 1)?;

    let root = Instance::new(&FOLDER)?;
    let shared = Instance::new(&FOLDER)?;
    root.set("permission", read_write.clone())?;
    shared.set("permission", read_only.clone())?;

    let mut children = Vec::with_capacity(files + 1);
    for index in 0..files {
        let file = Instance::new(&FILE)?;
        let bytes = (0..=index).map(|byte| byte as u8);
        file.set("contents", ArrayObject::from_values(&U8_ARRAY, bytes)?)?;
        file.set("created", 1_700_000_000 + index as i64)?;
        let permission = if index % 2 == 0 { &read_only } else { &read_write };
        file.set("permission", permission.clone())?;
        children.push(file);
    }

    let first = children.first().cloned().map(Value::from);
    shared.set(
        "contents",
        ArrayObject::from_values(&INODE_ARRAY, [first.unwrap_or_default()])?,
    )?;

    if cycles {
        shared.set("parent", root.clone())?;
        for file in &children {
            file.set("parent", root.clone())?;
        }
    }

    let mut contents: Vec<Value> =
        children.into_iter().map(Value::from).collect();
    contents.push(Value::from(shared));
    root.set(
        "contents",
        ArrayObject::from_values(&INODE_ARRAY, contents)?,
    )?;

    Ok(Value::from(root))
}

struct Summary {
    visited: usize,
    bytes: Option<usize>,
}

/// Prints each chain indented by its depth.
struct Printer {
    sizer: Option<Arc<dyn Instrumentation>>,
    visited: usize,
    bytes: usize,
}

impl ObjectVisitor for Printer {
    type Output = Summary;

    fn visit(&mut self, chain: &Chain) -> Traversal {
        self.visited += 1;
        let indent = chain.depth() * 2;
        let ty = chain.value_type();
        match &self.sizer {
            Some(sizer) if chain.value().is_object() => {
                let size = sizer.object_size(chain.value());
                self.bytes += size;
                println!("{:indent$}{chain}: {ty} ({size} bytes)", "");
            }
            _ => println!("{:indent$}{chain}: {ty}", ""),
        }
        Traversal::Explore
    }

    fn result(&mut self) -> Summary {
        Summary {
            visited: self.visited,
            bytes: self.sizer.as_ref().map(|_| self.bytes),
        }
    }
}

fn run(cli: &Cli) -> object_explorer::Result<()> {
    let root = sample_tree(cli.files, cli.cycles)?;

    let sizer = if cli.footprint {
        instrumentation::install(LayoutSizer::default())?;
        Some(instrumentation::instrumentation()?)
    } else {
        None
    };

    let mut features = Features::empty();
    features.set(Features::VISIT_NULL, cli.visit_nulls);
    features.set(Features::VISIT_PRIMITIVES, cli.visit_primitives);

    let mut predicates: Vec<Box<dyn FnMut(&Chain) -> bool>> = Vec::new();
    if cli.skip_enums_and_types {
        predicates.push(Box::new(|chain: &Chain| NotEnumOrType.apply(chain)));
    }
    if cli.once {
        let mut guard = AtMostOnce::new();
        predicates.push(Box::new(move |chain: &Chain| guard.apply(chain)));
    }

    let printer = Printer {
        sizer,
        visited: 0,
        bytes: 0,
    };
    let mut visitor = Filtered::new(
        move |chain: &Chain| {
            predicates.iter_mut().all(|predicate| predicate(chain))
        },
        printer,
    );

    let mut explorer = Explorer::new(&ExplorerCreateInfo {
        features,
        ..Default::default()
    });
    let summary = explorer.explore(root, &mut visitor)?;

    let stats = explorer.stats();
    info!(
        "{} chains offered, {} printed, {} expanded, work list peaked at {}",
        stats.visited, summary.visited, stats.expanded, stats.max_pending
    );
    if let Some(bytes) = summary.bytes {
        println!("footprint: {bytes} bytes");
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(err) = run(&cli) {
        error!("{err}");
        process::exit(1);
    }
}

