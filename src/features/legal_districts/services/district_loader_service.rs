use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;

use crate::core::config::DistrictConfig;
use crate::core::error::{AppError, Result};
use crate::features::legal_districts::models::NewLegalDistrict;
use crate::features::legal_districts::store::DistrictStore;
use crate::shared::constants::{DELETION_MARKER_COLUMN, MIN_SOURCE_FIELDS};

/// Why a source line produced no record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    TooFewFields,
    MissingCode,
    MissingProvince,
    /// Deletion date present: the district was retired upstream
    Retired,
    /// Neither city nor neighborhood: province-level rows are not searchable units
    ProvinceOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    Record(NewLegalDistrict),
    Skipped(SkipReason),
}

/// Parses one `code,province,city,neighborhood,village,...` line.
pub fn parse_line(line: &str) -> ParsedLine {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();

    if fields.len() < MIN_SOURCE_FIELDS {
        return ParsedLine::Skipped(SkipReason::TooFewFields);
    }

    let field = |index: usize| fields.get(index).copied().unwrap_or("");
    let (code, province, city, neighborhood, village) =
        (field(0), field(1), field(2), field(3), field(4));

    if code.is_empty() {
        return ParsedLine::Skipped(SkipReason::MissingCode);
    }
    if province.is_empty() {
        return ParsedLine::Skipped(SkipReason::MissingProvince);
    }
    if !field(DELETION_MARKER_COLUMN).is_empty() {
        return ParsedLine::Skipped(SkipReason::Retired);
    }
    if city.is_empty() && neighborhood.is_empty() {
        return ParsedLine::Skipped(SkipReason::ProvinceOnly);
    }

    ParsedLine::Record(NewLegalDistrict::new(
        code,
        province,
        Some(city),
        Some(neighborhood),
        Some(village),
    ))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Running,
    Completed,
    /// The store already had rows; nothing was read
    SkippedPopulated,
    Failed,
}

impl LoadState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Running,
            2 => Self::Completed,
            3 => Self::SkippedPopulated,
            4 => Self::Failed,
            _ => Self::Idle,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Self::Idle => 0,
            Self::Running => 1,
            Self::Completed => 2,
            Self::SkippedPopulated => 3,
            Self::Failed => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::SkippedPopulated => "skipped_populated",
            Self::Failed => "failed",
        }
    }
}

/// Counts for a single loader run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub lines_read: u64,
    pub inserted: u64,
    pub duplicates_skipped: u64,
    pub filtered: u64,
    pub failed: u64,
    pub batch_fallbacks: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(LoadSummary),
    AlreadyPopulated { existing: i64 },
}

/// Running totals across every loader run in this process
#[derive(Debug, Default)]
struct LoaderStats {
    state: AtomicU8,
    lines_read: AtomicU64,
    inserted: AtomicU64,
    duplicates_skipped: AtomicU64,
    filtered: AtomicU64,
    failed: AtomicU64,
    batch_fallbacks: AtomicU64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderStatsSnapshot {
    pub state: LoadState,
    pub lines_read: u64,
    pub inserted: u64,
    pub duplicates_skipped: u64,
    pub filtered: u64,
    pub failed: u64,
    pub batch_fallbacks: u64,
}

enum Tally {
    Line,
    Inserted(u64),
    Duplicate,
    Filtered,
    Failed,
    Fallback,
}

/// Rows queued for the next insert, with their codes for O(1) in-source duplicate checks
struct PendingBatch {
    rows: Vec<NewLegalDistrict>,
    codes: HashSet<String>,
}

impl PendingBatch {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            rows: Vec::with_capacity(capacity),
            codes: HashSet::with_capacity(capacity),
        }
    }

    fn contains(&self, code: &str) -> bool {
        self.codes.contains(code)
    }

    fn push(&mut self, record: NewLegalDistrict) {
        self.codes.insert(record.code.clone());
        self.rows.push(record);
    }

    fn len(&self) -> usize {
        self.rows.len()
    }

    fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn clear(&mut self) {
        self.rows.clear();
        self.codes.clear();
    }
}

/// One-time bulk ingestion of the legal district source file
pub struct DistrictLoaderService {
    store: Arc<dyn DistrictStore>,
    source_path: PathBuf,
    batch_size: usize,
    stats: LoaderStats,
    run_lock: Mutex<()>,
}

impl DistrictLoaderService {
    pub fn new(store: Arc<dyn DistrictStore>, config: &DistrictConfig) -> Self {
        Self {
            store,
            source_path: PathBuf::from(&config.source_path),
            batch_size: config.load_batch_size.max(1),
            stats: LoaderStats::default(),
            run_lock: Mutex::new(()),
        }
    }

    pub fn stats(&self) -> LoaderStatsSnapshot {
        LoaderStatsSnapshot {
            state: LoadState::from_u8(self.stats.state.load(Ordering::Relaxed)),
            lines_read: self.stats.lines_read.load(Ordering::Relaxed),
            inserted: self.stats.inserted.load(Ordering::Relaxed),
            duplicates_skipped: self.stats.duplicates_skipped.load(Ordering::Relaxed),
            filtered: self.stats.filtered.load(Ordering::Relaxed),
            failed: self.stats.failed.load(Ordering::Relaxed),
            batch_fallbacks: self.stats.batch_fallbacks.load(Ordering::Relaxed),
        }
    }

    fn set_state(&self, state: LoadState) {
        self.stats.state.store(state.as_u8(), Ordering::Relaxed);
    }

    fn tally(&self, summary: &mut LoadSummary, tally: Tally) {
        let (run, total, n) = match tally {
            Tally::Line => (&mut summary.lines_read, &self.stats.lines_read, 1),
            Tally::Inserted(n) => (&mut summary.inserted, &self.stats.inserted, n),
            Tally::Duplicate => (
                &mut summary.duplicates_skipped,
                &self.stats.duplicates_skipped,
                1,
            ),
            Tally::Filtered => (&mut summary.filtered, &self.stats.filtered, 1),
            Tally::Failed => (&mut summary.failed, &self.stats.failed, 1),
            Tally::Fallback => (&mut summary.batch_fallbacks, &self.stats.batch_fallbacks, 1),
        };
        *run += n;
        total.fetch_add(n, Ordering::Relaxed);
    }

    /// Loads the configured source unless the store already holds rows.
    ///
    /// An unreadable source aborts before anything is written; the caller may
    /// retry later.
    pub async fn load_if_empty(&self) -> Result<LoadOutcome> {
        let _guard = self
            .run_lock
            .try_lock()
            .map_err(|_| AppError::Conflict("District load is already running".to_string()))?;

        let existing = self.store.count().await.map_err(|e| {
            tracing::error!("Failed to count legal districts before loading: {:?}", e);
            self.set_state(LoadState::Failed);
            e
        })?;
        if existing > 0 {
            tracing::info!(
                "Legal district store already has {} rows, skipping bulk load",
                existing
            );
            self.set_state(LoadState::SkippedPopulated);
            return Ok(LoadOutcome::AlreadyPopulated { existing });
        }

        let file = File::open(&self.source_path).await.map_err(|e| {
            tracing::error!(
                "Failed to open legal district source {}: {:?}",
                self.source_path.display(),
                e
            );
            self.set_state(LoadState::Failed);
            AppError::LoadSource(e)
        })?;

        tracing::info!(
            "Loading legal districts from {} (batch size {})",
            self.source_path.display(),
            self.batch_size
        );

        let summary = self.ingest(BufReader::new(file)).await?;
        Ok(LoadOutcome::Loaded(summary))
    }

    /// Ingests any buffered source; the first line is a header and is skipped.
    pub async fn load_from_reader<R>(&self, reader: R) -> Result<LoadSummary>
    where
        R: AsyncBufRead + Unpin + Send,
    {
        let _guard = self
            .run_lock
            .try_lock()
            .map_err(|_| AppError::Conflict("District load is already running".to_string()))?;

        self.ingest(reader).await
    }

    async fn ingest<R>(&self, mut reader: R) -> Result<LoadSummary>
    where
        R: AsyncBufRead + Unpin + Send,
    {
        self.set_state(LoadState::Running);

        let mut summary = LoadSummary::default();
        let mut batch = PendingBatch::with_capacity(self.batch_size);
        let mut raw = Vec::new();
        let mut header_skipped = false;

        loop {
            raw.clear();
            match reader.read_until(b'\n', &mut raw).await {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(
                        "Legal district source became unreadable after {} lines: {:?}",
                        summary.lines_read,
                        e
                    );
                    self.set_state(LoadState::Failed);
                    return Err(AppError::LoadSource(e));
                }
            }

            if !header_skipped {
                header_skipped = true;
                continue;
            }

            // Undecodable bytes spoil one line, not the whole source
            let line = match std::str::from_utf8(&raw) {
                Ok(line) => line,
                Err(e) => {
                    self.tally(&mut summary, Tally::Line);
                    tracing::warn!(
                        "Skipping source line {} that is not valid UTF-8: {}",
                        summary.lines_read,
                        e
                    );
                    self.tally(&mut summary, Tally::Failed);
                    continue;
                }
            };
            if line.trim().is_empty() {
                continue;
            }

            self.tally(&mut summary, Tally::Line);

            let record = match parse_line(line) {
                ParsedLine::Record(record) => record,
                ParsedLine::Skipped(reason) => {
                    tracing::trace!("Skipping source line ({:?}): {}", reason, line.trim_end());
                    self.tally(&mut summary, Tally::Filtered);
                    continue;
                }
            };

            if batch.contains(&record.code) || self.already_stored(&record.code).await {
                self.tally(&mut summary, Tally::Duplicate);
                continue;
            }

            batch.push(record);
            if batch.len() >= self.batch_size {
                self.flush(&mut batch, &mut summary).await;
            }
        }

        self.flush(&mut batch, &mut summary).await;
        self.set_state(LoadState::Completed);

        tracing::info!(
            "Legal district load finished: lines={}, inserted={}, duplicates={}, filtered={}, failed={}, batch_fallbacks={}",
            summary.lines_read,
            summary.inserted,
            summary.duplicates_skipped,
            summary.filtered,
            summary.failed,
            summary.batch_fallbacks
        );

        Ok(summary)
    }

    /// A failed existence check lets the row through; the insert path still
    /// rejects duplicates.
    async fn already_stored(&self, code: &str) -> bool {
        match self.store.exists_by_code(code).await {
            Ok(exists) => exists,
            Err(e) => {
                tracing::warn!("Existence check failed for code {}: {:?}", code, e);
                false
            }
        }
    }

    async fn flush(&self, batch: &mut PendingBatch, summary: &mut LoadSummary) {
        if batch.is_empty() {
            return;
        }

        match self.store.insert_batch(&batch.rows).await {
            Ok(inserted) => {
                tracing::debug!("Inserted batch of {} legal districts", inserted);
                self.tally(summary, Tally::Inserted(inserted));
            }
            Err(e) => {
                tracing::warn!(
                    "Batch insert of {} legal districts failed, inserting individually: {:?}",
                    batch.len(),
                    e
                );
                self.tally(summary, Tally::Fallback);

                for row in &batch.rows {
                    match self.store.insert_one(row).await {
                        Ok(true) => self.tally(summary, Tally::Inserted(1)),
                        Ok(false) => self.tally(summary, Tally::Duplicate),
                        Err(e) => {
                            tracing::warn!("Failed to insert legal district {}: {:?}", row.code, e);
                            self.tally(summary, Tally::Failed);
                        }
                    }
                }
            }
        }

        batch.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::legal_districts::models::LegalDistrict;
    use crate::features::legal_districts::store::MemoryDistrictStore;
    use async_trait::async_trait;
    use fake::Fake;
    use std::sync::atomic::AtomicUsize;
    use tokio_test::{assert_err, assert_ok};

    const HEADER: &str = "법정동코드,시도명,시군구명,읍면동명,리명,순위,생성일자,삭제일자,과거법정동코드";

    fn source(lines: &[&str]) -> String {
        let mut text = String::from(HEADER);
        for line in lines {
            text.push('\n');
            text.push_str(line);
        }
        text
    }

    fn config(batch_size: usize) -> DistrictConfig {
        DistrictConfig {
            load_batch_size: batch_size,
            source_path: "does/not/exist.csv".to_string(),
            ..DistrictConfig::default()
        }
    }

    fn loader(store: Arc<dyn DistrictStore>, batch_size: usize) -> DistrictLoaderService {
        DistrictLoaderService::new(store, &config(batch_size))
    }

    #[test]
    fn test_parse_line_record() {
        let parsed = parse_line("1111010100,서울특별시,종로구,청운동,,1,1988-04-23,,");
        let ParsedLine::Record(record) = parsed else {
            panic!("expected a record");
        };
        assert_eq!(record.code, "1111010100");
        assert_eq!(record.city.as_deref(), Some("종로구"));
        assert_eq!(record.village, None);
        assert_eq!(record.full_address, "서울특별시 종로구 청운동");
    }

    #[test]
    fn test_parse_line_skip_reasons() {
        assert_eq!(
            parse_line("1111010100,서울특별시,종로구"),
            ParsedLine::Skipped(SkipReason::TooFewFields)
        );
        assert_eq!(
            parse_line(",서울특별시,종로구,청운동"),
            ParsedLine::Skipped(SkipReason::MissingCode)
        );
        assert_eq!(
            parse_line("1111010100,,종로구,청운동"),
            ParsedLine::Skipped(SkipReason::MissingProvince)
        );
        assert_eq!(
            parse_line("1111010100,서울특별시,종로구,청운동,,1,1988-04-23,2010-01-01,"),
            ParsedLine::Skipped(SkipReason::Retired)
        );
        assert_eq!(
            parse_line("1100000000,서울특별시,,,,1,1988-04-23,,"),
            ParsedLine::Skipped(SkipReason::ProvinceOnly)
        );
    }

    #[test]
    fn test_parse_line_tolerates_carriage_return() {
        let parsed = parse_line("1111010100,서울특별시,종로구,청운동\r");
        assert!(matches!(parsed, ParsedLine::Record(r) if r.neighborhood.as_deref() == Some("청운동")));
    }

    #[tokio::test]
    async fn test_load_filters_retired_and_province_only_rows() {
        let store = Arc::new(MemoryDistrictStore::new());
        let text = source(&[
            "1100000000,서울특별시,,,,1,1988-04-23,,",
            "1111000000,서울특별시,종로구,,,2,1988-04-23,,",
            "1111010100,서울특별시,종로구,청운동,,3,1988-04-23,,",
            "1111099999,서울특별시,종로구,폐지동,,4,1988-04-23,2009-12-31,",
        ]);

        let summary = assert_ok!(
            loader(store.clone(), 1000)
                .load_from_reader(BufReader::new(text.as_bytes()))
                .await
        );

        assert_eq!(summary.lines_read, 4);
        assert_eq!(summary.inserted, 2);
        assert_eq!(summary.filtered, 2);
        assert!(!store.exists_by_code("1100000000").await.unwrap());
        assert!(!store.exists_by_code("1111099999").await.unwrap());
        assert!(store.exists_by_code("1111010100").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_codes_in_source_are_counted() {
        let store = Arc::new(MemoryDistrictStore::new());
        let text = source(&[
            "1111010100,서울특별시,종로구,청운동",
            "1111010100,서울특별시,종로구,청운동",
            "1111010200,서울특별시,종로구,신교동",
        ]);

        let summary = loader(store.clone(), 2)
            .load_from_reader(BufReader::new(text.as_bytes()))
            .await
            .unwrap();

        assert_eq!(summary.inserted, 2);
        assert_eq!(summary.duplicates_skipped, 1);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_second_run_adds_nothing() {
        let store = Arc::new(MemoryDistrictStore::new());
        let text = source(&[
            "1111010100,서울특별시,종로구,청운동",
            "1111010200,서울특별시,종로구,신교동",
            "1111010300,서울특별시,종로구,궁정동",
        ]);
        let service = loader(store.clone(), 2);

        service
            .load_from_reader(BufReader::new(text.as_bytes()))
            .await
            .unwrap();
        let second = service
            .load_from_reader(BufReader::new(text.as_bytes()))
            .await
            .unwrap();

        assert_eq!(second.inserted, 0);
        assert_eq!(second.duplicates_skipped, 3);
        assert_eq!(store.count().await.unwrap(), 3);

        let stats = service.stats();
        assert_eq!(stats.inserted, 3);
        assert_eq!(stats.duplicates_skipped, 3);
        assert_eq!(stats.state, LoadState::Completed);
    }

    #[tokio::test]
    async fn test_random_sources_are_idempotent() {
        for _ in 0..5 {
            let count = (1..60usize).fake::<usize>();
            let lines: Vec<String> = (0..count)
                .map(|_| {
                    let code = (1_000_000_000u64..1_000_000_100).fake::<u64>();
                    let retired = if (0..4u8).fake::<u8>() == 0 { "2001-01-01" } else { "" };
                    format!("{code},서울특별시,종로구,동{code},,1,1988-04-23,{retired},")
                })
                .collect();
            let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
            let text = source(&refs);

            let store = Arc::new(MemoryDistrictStore::new());
            let service = loader(store.clone(), 7);

            service
                .load_from_reader(BufReader::new(text.as_bytes()))
                .await
                .unwrap();
            let after_first = store.count().await.unwrap();

            service
                .load_from_reader(BufReader::new(text.as_bytes()))
                .await
                .unwrap();
            assert_eq!(store.count().await.unwrap(), after_first);
        }
    }

    #[tokio::test]
    async fn test_load_if_empty_unreadable_source() {
        let store = Arc::new(MemoryDistrictStore::new());
        let service = loader(store.clone(), 1000);

        let result = service.load_if_empty().await;

        assert!(matches!(result, Err(AppError::LoadSource(_))));
        assert_eq!(store.count().await.unwrap(), 0);
        assert_eq!(service.stats().state, LoadState::Failed);
    }

    #[tokio::test]
    async fn test_load_if_empty_skips_populated_store() {
        let store = Arc::new(MemoryDistrictStore::new());
        store
            .insert_one(&NewLegalDistrict::new(
                "1111010100",
                "서울특별시",
                Some("종로구"),
                Some("청운동"),
                None,
            ))
            .await
            .unwrap();
        let service = loader(store.clone(), 1000);

        let outcome = assert_ok!(service.load_if_empty().await);

        assert_eq!(outcome, LoadOutcome::AlreadyPopulated { existing: 1 });
        assert_eq!(service.stats().state, LoadState::SkippedPopulated);
    }

    /// Store whose batch insert always fails and whose single insert rejects one code
    struct FlakyStore {
        inner: MemoryDistrictStore,
        poisoned_code: &'static str,
        batch_calls: AtomicUsize,
        fail_count: bool,
    }

    #[async_trait]
    impl DistrictStore for FlakyStore {
        async fn find_exact(&self, k: &str, e: &[String], l: usize) -> Result<Vec<LegalDistrict>> {
            self.inner.find_exact(k, e, l).await
        }
        async fn find_prefix(&self, k: &str, e: &[String], l: usize) -> Result<Vec<LegalDistrict>> {
            self.inner.find_prefix(k, e, l).await
        }
        async fn find_full_text(
            &self,
            k: &str,
            e: &[String],
            l: usize,
        ) -> Result<Vec<LegalDistrict>> {
            self.inner.find_full_text(k, e, l).await
        }
        async fn find_containing(
            &self,
            k: &str,
            e: &[String],
            l: usize,
        ) -> Result<Vec<LegalDistrict>> {
            self.inner.find_containing(k, e, l).await
        }
        async fn find_by_code(&self, code: &str) -> Result<Option<LegalDistrict>> {
            self.inner.find_by_code(code).await
        }
        async fn find_by_province(&self, p: &str, l: usize) -> Result<Vec<LegalDistrict>> {
            self.inner.find_by_province(p, l).await
        }
        async fn find_by_province_and_city(
            &self,
            p: &str,
            c: &str,
            l: usize,
        ) -> Result<Vec<LegalDistrict>> {
            self.inner.find_by_province_and_city(p, c, l).await
        }
        async fn exists_by_code(&self, code: &str) -> Result<bool> {
            self.inner.exists_by_code(code).await
        }
        async fn insert_batch(&self, _rows: &[NewLegalDistrict]) -> Result<u64> {
            self.batch_calls.fetch_add(1, Ordering::SeqCst);
            Err(AppError::Internal("bulk insert unavailable".to_string()))
        }
        async fn insert_one(&self, row: &NewLegalDistrict) -> Result<bool> {
            if row.code == self.poisoned_code {
                return Err(AppError::Internal("value too long".to_string()));
            }
            self.inner.insert_one(row).await
        }
        async fn count(&self) -> Result<i64> {
            if self.fail_count {
                return Err(AppError::Internal("connection refused".to_string()));
            }
            self.inner.count().await
        }
    }

    #[tokio::test]
    async fn test_batch_failure_falls_back_to_single_inserts() {
        let store = Arc::new(FlakyStore {
            inner: MemoryDistrictStore::new(),
            poisoned_code: "1111010200",
            batch_calls: AtomicUsize::new(0),
            fail_count: false,
        });
        let text = source(&[
            "1111010100,서울특별시,종로구,청운동",
            "1111010200,서울특별시,종로구,신교동",
            "1111010300,서울특별시,종로구,궁정동",
        ]);

        let summary = loader(store.clone(), 2)
            .load_from_reader(BufReader::new(text.as_bytes()))
            .await
            .unwrap();

        assert_eq!(store.batch_calls.load(Ordering::SeqCst), 2);
        assert_eq!(summary.batch_fallbacks, 2);
        assert_eq!(summary.inserted, 2);
        assert_eq!(summary.failed, 1);
        assert!(!store.exists_by_code("1111010200").await.unwrap());
        assert!(store.exists_by_code("1111010300").await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_run_is_rejected() {
        let store = Arc::new(MemoryDistrictStore::new());
        let service = loader(store, 1000);

        let _held = service.run_lock.lock().await;
        assert_err!(service.load_if_empty().await);
    }

    #[tokio::test]
    async fn test_failed_row_count_marks_load_failed() {
        let store = Arc::new(FlakyStore {
            inner: MemoryDistrictStore::new(),
            poisoned_code: "",
            batch_calls: AtomicUsize::new(0),
            fail_count: true,
        });
        let service = loader(store, 1000);

        assert_err!(service.load_if_empty().await);
        assert_eq!(service.stats().state, LoadState::Failed);
    }

    #[tokio::test]
    async fn test_undecodable_line_is_skipped_and_later_rows_load() {
        let store = Arc::new(MemoryDistrictStore::new());
        let mut bytes = source(&[
            "1111010100,서울특별시,종로구,청운동",
            "1111010200,서울특별시,종로구,신교동",
        ])
        .into_bytes();
        // Province and neighborhood encoded as CP949
        bytes.extend_from_slice(b"\n1111013800,\xBC\xAD\xBF\xEF,\xC1\xBE\xB7\xCE\n");
        bytes.extend_from_slice("1111010300,서울특별시,종로구,궁정동".as_bytes());

        let service = loader(store.clone(), 2);
        let summary = assert_ok!(service.load_from_reader(bytes.as_slice()).await);

        assert_eq!(summary.lines_read, 4);
        assert_eq!(summary.inserted, 3);
        assert_eq!(summary.failed, 1);
        assert!(store.exists_by_code("1111010300").await.unwrap());
        assert!(!store.exists_by_code("1111013800").await.unwrap());
        assert_eq!(service.stats().state, LoadState::Completed);
    }

    #[tokio::test]
    async fn test_codes_repeated_across_batch_boundary_are_duplicates() {
        let store = Arc::new(MemoryDistrictStore::new());
        let text = source(&[
            "1111010100,서울특별시,종로구,청운동",
            "1111010200,서울특별시,종로구,신교동",
            "1111010200,서울특별시,종로구,신교동",
            "1111010100,서울특별시,종로구,청운동",
            "1111010300,서울특별시,종로구,궁정동",
        ]);

        let summary = loader(store.clone(), 3)
            .load_from_reader(text.as_bytes())
            .await
            .unwrap();

        assert_eq!(summary.inserted, 3);
        assert_eq!(summary.duplicates_skipped, 2);
        assert_eq!(summary.batch_fallbacks, 0);
    }
}
