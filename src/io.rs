use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use itertools::Itertools;
use thiserror::Error;
use tracing::info;

use crate::distances::DistanceMatrix;
use crate::genebank::{Genebank, GenebankError};
use crate::genotype::GenotypeId;
use crate::picker::{Assignment, PickList};

// Column layout of the population dump files (whitespace separated).
const ID_COLUMN: usize = 0;
const PARENT_COLUMN: usize = 3;
const BIRTH_COLUMN: usize = 11;
const DEATH_COLUMN: usize = 12;
const DEPTH_COLUMN: usize = 13;
const GENOME_COLUMN: usize = 16;
const MIN_COLUMNS: usize = GENOME_COLUMN + 1;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}, line {line}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error(transparent)]
    Genebank(#[from] GenebankError),

    #[error("No organisms found in population file {}", .0.display())]
    EmptyPopulation(PathBuf),
}

/// One organism as read from a population file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenotypeRecord {
    pub id: GenotypeId,
    pub parent_id: GenotypeId,
    pub tree_depth: i64,
    pub birth: i64,
    pub death: i64,
    pub genes: String,
}

/// Opens a file for reading, gunzipping it if the name ends in `.gz`.
fn open_input(path: &Path) -> io::Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    if path.to_string_lossy().ends_with(".gz") {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Output file, gzip-compressed when its name ends in `.gz`.
///
/// Must be closed with [`Output::finish`]: the gzip trailer is only written
/// there, and dropping the encoder would swallow any error it hits.
enum Output {
    Plain(BufWriter<File>),
    Gzip(BufWriter<GzEncoder<File>>),
}

impl Output {
    fn create(path: &Path) -> io::Result<Self> {
        let file = File::create(path)?;
        if path.to_string_lossy().ends_with(".gz") {
            Ok(Output::Gzip(BufWriter::new(GzEncoder::new(file, Compression::default()))))
        } else {
            Ok(Output::Plain(BufWriter::new(file)))
        }
    }

    fn finish(self) -> io::Result<()> {
        match self {
            Output::Plain(mut out) => out.flush(),
            Output::Gzip(out) => {
                let encoder = out.into_inner().map_err(io::IntoInnerError::into_error)?;
                encoder.finish()?;
                Ok(())
            }
        }
    }
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Plain(out) => out.write(buf),
            Output::Gzip(out) => out.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Plain(out) => out.flush(),
            Output::Gzip(out) => out.flush(),
        }
    }
}

/// Formats a float with six significant digits, trailing zeros dropped and
/// scientific notation outside 1e-4..1e6 (`%g` style), matching existing
/// cluster reports.
fn format_significant(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return value.to_string();
    }
    // Rounded to six digits first, so 999999.5 moves to the next exponent.
    let scientific = format!("{value:.5e}");
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if (-4..6).contains(&exponent) {
        let decimals = (5 - exponent) as usize;
        trim_fraction(&format!("{value:.decimals$}")).to_string()
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{sign}{:02}", trim_fraction(mantissa), exponent.abs())
    }
}

fn trim_fraction(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}

/// Read all genotype records from a population file.
///
/// Blank lines and lines starting with `#` are skipped. Columns past the
/// genome are ignored, since historic dumps grow extra columns once
/// organisms start dying.
pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<GenotypeRecord>, LoadError> {
    let path = path.as_ref();
    let reader = open_input(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_records(reader, path)
}

/// Parse genotype records from any reader; `path` is only used in errors.
pub fn parse_records<R: BufRead>(reader: R, path: &Path) -> Result<Vec<GenotypeRecord>, LoadError> {
    let mut records = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // 1-based, as editors show them
        let line_num = i + 1;
        let parse_error = |message: String| LoadError::Parse {
            path: path.to_path_buf(),
            line: line_num,
            message,
        };

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < MIN_COLUMNS {
            return Err(parse_error(format!(
                "expected at least {MIN_COLUMNS} columns, found {}",
                fields.len()
            )));
        }

        let number = |column: usize, name: &str| -> Result<i64, LoadError> {
            fields[column]
                .parse::<i64>()
                .map_err(|_| parse_error(format!("invalid {name} '{}'", fields[column])))
        };

        records.push(GenotypeRecord {
            id: number(ID_COLUMN, "id")?,
            parent_id: number(PARENT_COLUMN, "parent id")?,
            tree_depth: number(DEPTH_COLUMN, "tree depth")?,
            birth: number(BIRTH_COLUMN, "birth")?,
            death: number(DEATH_COLUMN, "death")?,
            genes: fields[GENOME_COLUMN].to_string(),
        });
    }

    Ok(records)
}

/// Builds a linked genebank from the current and historic populations and
/// seeds coalescence from the first current organism.
///
/// Returns the genebank and the ids of the current population, in input order.
pub fn build_genebank(
    current: &[GenotypeRecord],
    historic: &[GenotypeRecord],
) -> Result<(Genebank, Vec<GenotypeId>), GenebankError> {
    let mut bank = Genebank::new();
    for r in current.iter().chain(historic) {
        bank.create(r.id, r.parent_id, r.tree_depth, r.birth, r.death, r.genes.as_str())?;
    }
    bank.link();

    let population: Vec<GenotypeId> = current.iter().map(|r| r.id).collect();
    if let Some(&seed) = population.first() {
        bank.check_coalescence(seed)?;
    }
    Ok((bank, population))
}

/// Reads both population files and builds the genebank.
///
/// # Errors
/// Fails on unreadable or malformed files, duplicate ids across the two
/// files, or an empty current population.
pub fn load_population<P: AsRef<Path>, Q: AsRef<Path>>(
    detail: P,
    historic: Q,
) -> Result<(Genebank, Vec<GenotypeId>), LoadError> {
    let current = read_records(detail.as_ref())?;
    if current.is_empty() {
        return Err(LoadError::EmptyPopulation(detail.as_ref().to_path_buf()));
    }
    info!("Current population: {} organisms", current.len());

    let past = read_records(historic.as_ref())?;
    info!("Historic population: {} organisms", past.len());

    Ok(build_genebank(&current, &past)?)
}

/// Write the cluster report: summary statistics, the pick list and the
/// nearest-representative assignment of every organism.
///
/// A pick rejected by the cutoff is listed with the picks but does not count
/// as a cluster.
pub fn write_cluster_report<P: AsRef<Path>>(
    path: P,
    matrix: &DistanceMatrix,
    picks: &PickList,
    assignments: &[Assignment],
    cutoff: i64,
) -> io::Result<()> {
    let mut out = Output::create(path.as_ref())?;

    writeln!(out, "#Maximum distance between organisms: {}", matrix.max_distance)?;
    writeln!(
        out,
        "#Average distance between organisms: {}",
        format_significant(matrix.average_distance)
    )?;
    writeln!(out, "#Cutoff pick value: {cutoff}")?;
    writeln!(out, "#<organism ID> <pick value>")?;
    for pick in picks.picks.iter().chain(&picks.rejected) {
        writeln!(out, "{} {}", matrix.ids[pick.row], pick.coverage)?;
    }

    writeln!(out, "#Number of Clusters: {}", picks.len())?;
    writeln!(out, "#<genotype> <closest picked genotype> <distance>")?;
    for a in assignments {
        writeln!(out, "{} {} {}", a.organism, a.representative, a.distance)?;
    }

    out.finish()
}

/// Write a labeled square matrix as TSV.
/// If `path` ends with `.gz`, the output is gzip-compressed.
pub fn write_matrix_tsv<P: AsRef<Path>>(path: P, matrix: &DistanceMatrix) -> io::Result<()> {
    let mut out = Output::create(path.as_ref())?;

    writeln!(out, "\t{}", matrix.ids.iter().join("\t"))?;
    for (id, row) in matrix.ids.iter().zip(&matrix.values) {
        writeln!(out, "{}\t{}", id, row.iter().join("\t"))?;
    }

    out.finish()
}
