use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// One step of one job. Every operation runs on a fixed machine with a
/// fixed duration, both recorded in the [`Instance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Operation {
    pub job: usize,
    pub step: usize,
}

impl Operation {
    pub fn new(job: usize, step: usize) -> Self {
        Operation { job, step }
    }

    /// The previous step of the same job, if any.
    pub fn job_predecessor(&self) -> Option<Operation> {
        if self.step > 0 {
            Some(Operation::new(self.job, self.step - 1))
        } else {
            None
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.job, self.step)
    }
}

#[derive(Debug)]
pub enum ParseError {
    Io(std::io::Error),
    Missing(&'static str),
    BadNumber(String),
    RowLength { row: usize, expected: usize, found: usize },
    BadMachine { job: usize, value: usize },
    MachinesNotPermutation { job: usize },
    EmptyDimension,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Io(err) => write!(f, "could not read instance: {}", err),
            ParseError::Missing(what) => write!(f, "missing {}", what),
            ParseError::BadNumber(token) => write!(f, "'{}' is not a number", token),
            ParseError::RowLength { row, expected, found } => {
                write!(f, "row {} has {} entries, expected {}", row, found, expected)
            }
            ParseError::BadMachine { job, value } => {
                write!(f, "job {} references machine {} outside the machine set", job, value)
            }
            ParseError::MachinesNotPermutation { job } => {
                write!(f, "job {} does not visit every machine exactly once", job)
            }
            ParseError::EmptyDimension => write!(f, "job and machine counts must be positive"),
        }
    }
}

impl std::error::Error for ParseError {}

impl From<std::io::Error> for ParseError {
    fn from(err: std::io::Error) -> Self {
        ParseError::Io(err)
    }
}

/// Immutable description of a job-shop instance: for every job an ordered
/// run of operations, one per machine.
///
/// Instance files follow the layout of the instances at
/// <https://www.eii.uva.es/elena/JSSP/InstancesJSSP.htm>: job count, machine
/// count, best known makespan, a duration matrix and a machine matrix
/// (machines 1-indexed in the file).
#[derive(Debug, Clone)]
pub struct Instance {
    num_jobs: usize,
    num_machines: usize,
    /// Processing times, job-major.
    durations: Vec<u32>,
    /// Machine of every operation, job-major, 0-indexed.
    placements: Vec<usize>,
    /// Best known makespan recorded in the instance file.
    optimal: u32,
}

impl Instance {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, ParseError> {
        Self::from_reader(File::open(path)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ParseError> {
        let mut lines = Vec::new();
        for line in BufReader::new(reader).lines() {
            let line = line?;
            if !line.trim().is_empty() {
                lines.push(line);
            }
        }
        let mut lines = lines.iter();

        let num_jobs = scalar(lines.next(), "job count")? as usize;
        let num_machines = scalar(lines.next(), "machine count")? as usize;
        let optimal = scalar(lines.next(), "optimal bound")?;
        if num_jobs == 0 || num_machines == 0 {
            return Err(ParseError::EmptyDimension);
        }

        let mut durations = Vec::with_capacity(num_jobs * num_machines);
        for row in 0..num_jobs {
            durations.extend(matrix_row(lines.next(), row, num_machines)?);
        }

        let mut placements = Vec::with_capacity(num_jobs * num_machines);
        for row in 0..num_jobs {
            let machines = matrix_row(lines.next(), row, num_machines)?;
            let mut seen = vec![false; num_machines];
            for value in machines {
                let value = value as usize;
                // Machine ids are 1-indexed in the file.
                if value == 0 || value > num_machines {
                    return Err(ParseError::BadMachine { job: row, value });
                }
                if seen[value - 1] {
                    return Err(ParseError::MachinesNotPermutation { job: row });
                }
                seen[value - 1] = true;
                placements.push(value - 1);
            }
        }

        Ok(Instance { num_jobs, num_machines, durations, placements, optimal })
    }

    /// Builds an instance from per-job duration and machine rows
    /// (machines 0-indexed). Rows must already satisfy the
    /// one-operation-per-machine invariant.
    pub fn from_parts(durations: Vec<Vec<u32>>, placements: Vec<Vec<usize>>, optimal: u32) -> Self {
        let num_jobs = durations.len();
        let num_machines = durations.first().map(|row| row.len()).unwrap_or(0);
        debug_assert_eq!(num_jobs, placements.len());
        debug_assert!(placements.iter().all(|row| row.len() == num_machines));

        Instance {
            num_jobs,
            num_machines,
            durations: durations.into_iter().flatten().collect(),
            placements: placements.into_iter().flatten().collect(),
            optimal,
        }
    }

    pub fn num_jobs(&self) -> usize {
        self.num_jobs
    }

    pub fn num_machines(&self) -> usize {
        self.num_machines
    }

    /// Operations per job; every job visits every machine exactly once.
    pub fn num_steps(&self) -> usize {
        self.num_machines
    }

    pub fn num_operations(&self) -> usize {
        self.num_jobs * self.num_machines
    }

    pub fn optimal(&self) -> u32 {
        self.optimal
    }

    pub fn duration(&self, job: usize, step: usize) -> u32 {
        self.durations[job * self.num_machines + step]
    }

    pub fn machine(&self, job: usize, step: usize) -> usize {
        self.placements[job * self.num_machines + step]
    }

    pub fn duration_of(&self, op: Operation) -> u32 {
        self.duration(op.job, op.step)
    }

    pub fn machine_of(&self, op: Operation) -> usize {
        self.machine(op.job, op.step)
    }

    /// All operations in job-major order.
    pub fn operations(&self) -> impl Iterator<Item = Operation> + '_ {
        (0..self.num_jobs)
            .flat_map(move |job| (0..self.num_steps()).map(move |step| Operation::new(job, step)))
    }
}

fn scalar(line: Option<&String>, what: &'static str) -> Result<u32, ParseError> {
    let line = line.ok_or(ParseError::Missing(what))?;
    line.trim().parse().map_err(|_| ParseError::BadNumber(line.trim().to_owned()))
}

fn matrix_row(line: Option<&String>, row: usize, expected: usize) -> Result<Vec<u32>, ParseError> {
    let line = line.ok_or(ParseError::Missing("matrix row"))?;
    let values = line
        .split_whitespace()
        .map(|token| token.parse().map_err(|_| ParseError::BadNumber(token.to_owned())))
        .collect::<Result<Vec<u32>, _>>()?;
    if values.len() != expected {
        return Err(ParseError::RowLength { row, expected, found: values.len() });
    }
    Ok(values)
}
