use std::ffi::OsString;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use clap::Parser;
use log::{info, warn};

/// Verbosity of user information
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Quiet,
    Warnings,
    Info,
    Debug,
    Trace,
}

impl Verbosity {
    pub fn level_filter(self) -> log::LevelFilter {
        match self {
            Verbosity::Quiet => log::LevelFilter::Off,
            Verbosity::Warnings => log::LevelFilter::Warn,
            Verbosity::Info => log::LevelFilter::Info,
            Verbosity::Debug => log::LevelFilter::Debug,
            Verbosity::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Zip, Unzip, Test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Zip,
    Unzip,
    Test,
}
impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Extension given to compressed artifacts
pub const ARTIFACT_EXT: &str = "huf";
/// Extension given to code files
pub const CODE_EXT: &str = "code";
/// Extension given to restored files
pub const RESTORED_EXT: &str = "out";

#[derive(Debug, Clone)]
pub struct HuffOpts {
    /// File to compress, or artifact to restore
    pub file: PathBuf,
    /// Code file location, if not the default
    pub code_file: Option<PathBuf>,
    /// Output location, if not the default
    pub output: Option<PathBuf>,
    /// Silently overwrite existing files with the same name
    pub force_overwrite: bool,
    /// Compress/Decompress/Test
    pub op_mode: Mode,
    /// End the stream with this reserved byte instead of recording the symbol count
    pub sentinel: Option<u8>,
    /// Verbosity of user information
    pub verbose: Verbosity,
}

impl HuffOpts {
    pub fn new<P: Into<PathBuf>>(file: P) -> Self {
        Self {
            file: file.into(),
            code_file: None,
            output: None,
            force_overwrite: false,
            op_mode: Mode::Zip,
            sentinel: None,
            verbose: Verbosity::Warnings,
        }
    }

    /// The artifact's name without its .huf extension (or unchanged if it has none).
    fn restore_base(&self) -> PathBuf {
        match self.file.extension() {
            Some(ext) if ext == ARTIFACT_EXT => self.file.with_extension(""),
            _ => self.file.clone(),
        }
    }

    /// Where the compressed artifact lives (written when zipping, read otherwise).
    pub fn artifact_path(&self) -> PathBuf {
        match self.op_mode {
            Mode::Zip => self
                .output
                .clone()
                .unwrap_or_else(|| add_ext(&self.file, ARTIFACT_EXT)),
            Mode::Unzip | Mode::Test => self.file.clone(),
        }
    }

    /// Where the code file lives (written when zipping, read otherwise).
    pub fn code_path(&self) -> PathBuf {
        if let Some(code) = &self.code_file {
            return code.clone();
        }
        match self.op_mode {
            Mode::Zip => add_ext(&self.file, CODE_EXT),
            Mode::Unzip | Mode::Test => add_ext(&self.restore_base(), CODE_EXT),
        }
    }

    /// Where decompressed data goes.
    pub fn restored_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| add_ext(&self.restore_base(), RESTORED_EXT))
    }
}

/// foo.txt + huf = foo.txt.huf
fn add_ext(path: &Path, ext: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

/// Command Line Interpretation - uses external CLAP crate.
#[derive(Parser, Debug)]
#[clap(
    version,
    about = "A static Huffman file compressor",
    long_about = "
    Compressing FILE writes FILE.huf (the packed bitstream) and FILE.code (the code table, as
    text). Decompressing FILE.huf reads FILE.code and writes FILE.out. The original is never
    touched."
)]
pub struct Args {
    /// File to process
    filename: PathBuf,

    /// Compress the input file (the default)
    #[clap(short = 'z', long = "compress")]
    compress: bool,

    /// Decompress the input file
    #[clap(short = 'd', long = "decompress")]
    decompress: bool,

    /// Test compressed file integrity
    #[clap(short = 't', long = "test")]
    test: bool,

    /// Code file to write or read
    #[clap(long = "code")]
    code: Option<PathBuf>,

    /// Output file
    #[clap(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Force overwriting output files
    #[clap(short = 'f', long = "force")]
    force: bool,

    /// End the stream with this reserved byte value instead of a symbol count
    #[clap(long = "sentinel")]
    sentinel: Option<u8>,

    /// Be verbose (a 2nd -v gives more)
    #[clap(short = 'v', long = "verbose", parse(from_occurrences))]
    verbose: u8,

    /// Suppress noncritical messages
    #[clap(short = 'q', long = "quiet")]
    quiet: bool,
}

impl From<Args> for HuffOpts {
    fn from(args: Args) -> Self {
        let mut opts = HuffOpts::new(args.filename);
        opts.op_mode = if args.test {
            Mode::Test
        } else if args.decompress {
            Mode::Unzip
        } else {
            Mode::Zip
        };
        opts.code_file = args.code;
        opts.output = args.output;
        opts.force_overwrite = args.force;
        opts.sentinel = args.sentinel;
        opts.verbose = match (args.quiet, args.verbose) {
            (true, _) => Verbosity::Quiet,
            (false, 0) => Verbosity::Warnings,
            (false, 1) => Verbosity::Info,
            (false, 2) => Verbosity::Debug,
            _ => Verbosity::Trace,
        };
        opts
    }
}

/// Read the command line, set the log level and report the settings.
pub fn huffopts_init() -> HuffOpts {
    let opts = HuffOpts::from(Args::parse());
    log::set_max_level(opts.verbose.level_filter());

    info!("---- huff Initialization Start ----");
    info!("Verbosity set to {}", log::max_level());
    info!("Operational mode set to {}", opts.op_mode);
    info!("Input file is {}", opts.file.display());
    match opts.op_mode {
        Mode::Zip => {
            info!("Artifact goes to {}", opts.artifact_path().display());
            info!("Code table goes to {}", opts.code_path().display());
            match opts.sentinel {
                Some(s) => warn!("Ending the stream with sentinel byte {}", s),
                None => info!("Recording the symbol count in the header"),
            }
        }
        Mode::Unzip => {
            info!("Code table comes from {}", opts.code_path().display());
            info!("Restored data goes to {}", opts.restored_path().display());
        }
        Mode::Test => info!("Code table comes from {}", opts.code_path().display()),
    }
    if opts.force_overwrite {
        info!("Forcing file overwriting")
    };
    info!("---- huff Initialization End ----");
    opts
}
