use std::fmt;
use std::str::FromStr;

/// Every diagnostic report the client can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Report {
    CacheHit,
    IndexUsage,
    Calls,
    Blocking,
    Outliers,
    VacuumStats,
    Bloat,
    LongRunningQueries,
    SeqScans,
    UnusedIndexes,
    TotalTableSize,
    TotalIndexesSize,
    TableSize,
    IndexSize,
    TotalIndexSize,
    Locks,
    TableIndexesSize,
    Ps,
    Version,
}

/// Display options accepted by the reports that print query text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportOptions {
    /// Shorten query text to 40 characters (`calls`, `outliers`).
    pub truncate: bool,
}

impl Report {
    pub const ALL: [Report; 19] = [
        Report::CacheHit,
        Report::IndexUsage,
        Report::Calls,
        Report::Blocking,
        Report::Outliers,
        Report::VacuumStats,
        Report::Bloat,
        Report::LongRunningQueries,
        Report::SeqScans,
        Report::UnusedIndexes,
        Report::TotalTableSize,
        Report::TotalIndexesSize,
        Report::TableSize,
        Report::IndexSize,
        Report::TotalIndexSize,
        Report::Locks,
        Report::TableIndexesSize,
        Report::Ps,
        Report::Version,
    ];

    /// Kebab-case command name.
    pub fn name(&self) -> &'static str {
        match self {
            Report::CacheHit => "cache-hit",
            Report::IndexUsage => "index-usage",
            Report::Calls => "calls",
            Report::Blocking => "blocking",
            Report::Outliers => "outliers",
            Report::VacuumStats => "vacuum-stats",
            Report::Bloat => "bloat",
            Report::LongRunningQueries => "long-running-queries",
            Report::SeqScans => "seq-scans",
            Report::UnusedIndexes => "unused-indexes",
            Report::TotalTableSize => "total-table-size",
            Report::TotalIndexesSize => "total-indexes-size",
            Report::TableSize => "table-size",
            Report::IndexSize => "index-size",
            Report::TotalIndexSize => "total-index-size",
            Report::Locks => "locks",
            Report::TableIndexesSize => "table-indexes-size",
            Report::Ps => "ps",
            Report::Version => "version",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Report::CacheHit => "index and table cache hit rate (healthy databases are at 99% and up)",
            Report::IndexUsage => "percentage of scans that used an index, per table",
            Report::Calls => {
                "10 most frequently called queries (reads total_time: pg_stat_statements before 1.8)"
            }
            Report::Blocking => "queries holding locks that other queries are waiting on",
            Report::Outliers => {
                "10 queries with the longest aggregate execution time (reads total_time: pg_stat_statements before 1.8)"
            }
            Report::VacuumStats => "dead rows and whether autovacuum is expected to run",
            Report::Bloat => "table and index bloat, most wasteful first",
            Report::LongRunningQueries => "queries running longer than five minutes",
            Report::SeqScans => "sequential scan count per table",
            Report::UnusedIndexes => "unused and almost unused indexes",
            Report::TotalTableSize => "table sizes including indexes",
            Report::TotalIndexesSize => "total size of all indexes on each table",
            Report::TableSize => "table sizes excluding indexes",
            Report::IndexSize => "size of each index",
            Report::TotalIndexSize => "total size of all indexes",
            Report::Locks => "queries holding exclusive locks",
            Report::TableIndexesSize => "index size per table",
            Report::Ps => {
                "currently running queries with their duration (reads waiting: servers before 9.6)"
            }
            Report::Version => "PostgreSQL server version",
        }
    }

    /// Reports that read `pg_stat_statements`.
    pub fn needs_statement_stats(&self) -> bool {
        matches!(self, Report::Calls | Report::Outliers)
    }

    /// Reports whose SQL depends on the server version.
    pub fn needs_server_version(&self) -> bool {
        matches!(
            self,
            Report::Blocking | Report::LongRunningQueries | Report::Locks | Report::Ps
        )
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Report {
    type Err = String;

    /// Accepts `cache-hit`, `cache_hit` and any letter case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        Report::ALL
            .iter()
            .copied()
            .find(|r| r.name() == wanted)
            .ok_or_else(|| format!("unknown report '{}'", s.trim()))
    }
}
