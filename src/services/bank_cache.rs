//! 题库缓存
//!
//! 第一次请求时执行 获取 → 解析 → 归一化，之后一直返回同一个 `Arc<QuestionBank>`。
//!
//! ## 并发
//!
//! 加载期间的并发调用共享同一个进行中的 future（single-flight），
//! 得到完全相同的结果（同一个题库或同一个错误），工作簿只会被获取一次。
//! 加载失败会清空进行中的状态，后续调用可以重试。
//!
//! 加载在独立的 tokio 任务中执行：即使所有调用方都不再等待，也会运行到结束，
//! 并由任务自己更新缓存状态。

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use tracing::{debug, info, warn};

use crate::clients::WorkbookSource;
use crate::error::{BankError, BankResult};
use crate::models::{read_workbook, QuestionBank, SchemaDescriptor};
use crate::services::row_normalizer::normalize_workbook;
use crate::utils::logging::log_bank_loaded;

type SharedLoad = Shared<BoxFuture<'static, BankResult<Arc<QuestionBank>>>>;

enum CacheState {
    Empty,
    Loading { attempt: u64, load: SharedLoad },
    Ready(Arc<QuestionBank>),
}

struct Slot {
    state: CacheState,
    attempts: u64,
}

/// 单次加载、多方读取的题库缓存
pub struct QuestionBankCache {
    source: Arc<dyn WorkbookSource>,
    schema: Arc<SchemaDescriptor>,
    slot: Arc<Mutex<Slot>>,
}

impl QuestionBankCache {
    pub fn new(source: Arc<dyn WorkbookSource>, schema: SchemaDescriptor) -> Self {
        Self {
            source,
            schema: Arc::new(schema),
            slot: Arc::new(Mutex::new(Slot {
                state: CacheState::Empty,
                attempts: 0,
            })),
        }
    }

    /// 获取题库，必要时触发（或加入进行中的）加载
    ///
    /// 必须在 tokio 运行时中调用。
    pub async fn load(&self) -> BankResult<Arc<QuestionBank>> {
        let (attempt, load) = {
            let mut guard = lock(&self.slot);
            let slot = &mut *guard;
            match &slot.state {
                CacheState::Ready(bank) => return Ok(Arc::clone(bank)),
                CacheState::Loading { attempt, load } => {
                    debug!("加入进行中的题库加载 (第 {} 次)", attempt);
                    (*attempt, load.clone())
                }
                CacheState::Empty => {
                    slot.attempts += 1;
                    let attempt = slot.attempts;
                    let load = self.start_load(attempt);
                    slot.state = CacheState::Loading {
                        attempt,
                        load: load.clone(),
                    };
                    (attempt, load)
                }
            }
        };

        let outcome = load.await;
        // 任务异常终止时不会自己更新状态
        settle(&self.slot, attempt, &outcome);
        outcome
    }

    /// 已加载时直接返回题库，不触发加载
    pub fn peek(&self) -> Option<Arc<QuestionBank>> {
        match &lock(&self.slot).state {
            CacheState::Ready(bank) => Some(Arc::clone(bank)),
            _ => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.peek().is_some()
    }

    fn start_load(&self, attempt: u64) -> SharedLoad {
        let source = Arc::clone(&self.source);
        let schema = Arc::clone(&self.schema);
        let slot = Arc::clone(&self.slot);
        let location = source.location();

        let task = tokio::spawn(async move {
            info!("📥 正在加载题库 (第 {} 次): {}", attempt, source.location());
            let outcome = fetch_and_build(source.as_ref(), &schema).await;
            settle(&slot, attempt, &outcome);
            outcome
        });

        async move {
            match task.await {
                Ok(outcome) => outcome,
                Err(e) => Err(BankError::SourceUnavailable {
                    location,
                    reason: format!("加载任务异常终止: {}", e),
                }),
            }
        }
        .boxed()
        .shared()
    }
}

fn lock(slot: &Mutex<Slot>) -> MutexGuard<'_, Slot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// 加载结束后更新状态；只处理仍然属于本次加载的状态
fn settle(slot: &Mutex<Slot>, attempt: u64, outcome: &BankResult<Arc<QuestionBank>>) {
    let mut slot = lock(slot);
    let current = match &slot.state {
        CacheState::Loading { attempt: current, .. } => *current,
        _ => return,
    };
    if current != attempt {
        return;
    }

    slot.state = match outcome {
        Ok(bank) => CacheState::Ready(Arc::clone(bank)),
        Err(e) => {
            warn!("❌ 题库加载失败 (第 {} 次)，下次请求将重试: {}", attempt, e);
            CacheState::Empty
        }
    };
}

/// 获取 → 解析 → 归一化
async fn fetch_and_build(
    source: &dyn WorkbookSource,
    schema: &SchemaDescriptor,
) -> BankResult<Arc<QuestionBank>> {
    let location = source.location();

    let bytes = source
        .fetch()
        .await
        .map_err(|e| BankError::source_unavailable(&location, &e))?;
    debug!("已获取工作簿 {} ({} 字节)", location, bytes.len());

    let workbook = read_workbook(bytes)?;
    let normalized = normalize_workbook(&workbook, schema)?;

    let bank = QuestionBank::new(
        normalized.questions,
        normalized.tests,
        normalized.play_questions,
    );
    log_bank_loaded(&location, &bank.summary(), &normalized.diagnostics);

    Ok(Arc::new(bank))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Cell, Key};
    use crate::test_support::{build_xlsx, current_sheets};
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};

    /// 记录获取次数的来源；前 `failures` 次返回错误
    struct CountingSource {
        bytes: Vec<u8>,
        delay: Duration,
        failures: usize,
        fetches: AtomicUsize,
    }

    impl CountingSource {
        fn new(bytes: Vec<u8>, delay: Duration, failures: usize) -> Arc<Self> {
            Arc::new(Self {
                bytes,
                delay,
                failures,
                fetches: AtomicUsize::new(0),
            })
        }

        fn fetches(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    impl WorkbookSource for CountingSource {
        fn location(&self) -> String {
            "memory:counting".to_string()
        }

        fn fetch(&self) -> BoxFuture<'_, anyhow::Result<Vec<u8>>> {
            async move {
                let n = self.fetches.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(self.delay).await;
                if n < self.failures {
                    Err(anyhow!("network down"))
                } else {
                    Ok(self.bytes.clone())
                }
            }
            .boxed()
        }
    }

    fn counting(delay: Duration, failures: usize) -> Arc<CountingSource> {
        CountingSource::new(build_xlsx(&current_sheets()), delay, failures)
    }

    fn cache_for(source: &Arc<CountingSource>) -> Arc<QuestionBankCache> {
        let source: Arc<dyn WorkbookSource> = source.clone();
        Arc::new(QuestionBankCache::new(source, SchemaDescriptor::current()))
    }

    #[tokio::test]
    async fn test_concurrent_first_calls_fetch_once() {
        let source = counting(Duration::from_millis(50), 0);
        let cache = cache_for(&source);

        let loads = (0..16).map(|_| cache.load());
        let results = futures::future::join_all(loads).await;

        assert_eq!(source.fetches(), 1);
        let first = assert_ok!(results[0].clone());
        for result in &results {
            let bank = assert_ok!(result.clone());
            assert!(Arc::ptr_eq(&first, &bank));
        }
        assert!(cache.is_loaded());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_tasks_share_one_load() {
        let source = counting(Duration::from_millis(50), 0);
        let cache = cache_for(&source);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move { cache.load().await })
            })
            .collect();

        for handle in handles {
            assert_ok!(handle.await.unwrap());
        }
        assert_eq!(source.fetches(), 1);

        // 加载完成后的调用不再获取
        assert_ok!(cache.load().await);
        assert_eq!(source.fetches(), 1);
    }

    #[tokio::test]
    async fn test_failure_is_shared_then_retried() {
        let source = counting(Duration::from_millis(20), 1);
        let cache = cache_for(&source);

        let results = futures::future::join_all((0..4).map(|_| cache.load())).await;

        assert_eq!(source.fetches(), 1);
        let first = assert_err!(results[0].clone());
        assert!(matches!(first, BankError::SourceUnavailable { .. }));
        assert!(results.iter().all(|r| r.as_ref().err() == Some(&first)));
        assert!(!cache.is_loaded());

        // 失败不会永久污染缓存
        let bank = assert_ok!(cache.load().await);
        assert_eq!(source.fetches(), 2);
        assert_eq!(bank.questions().len(), 3);
    }

    #[tokio::test]
    async fn test_load_runs_to_completion_without_waiters() {
        let source = counting(Duration::from_millis(50), 0);
        let cache = cache_for(&source);

        let timed_out = tokio::time::timeout(Duration::from_millis(5), cache.load()).await;
        assert!(timed_out.is_err());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_ok!(cache.load().await);
        assert_eq!(source.fetches(), 1);
    }

    #[tokio::test]
    async fn test_abandoned_failure_is_not_served_later() {
        let source = counting(Duration::from_millis(20), 1);
        let cache = cache_for(&source);

        let timed_out = tokio::time::timeout(Duration::from_millis(5), cache.load()).await;
        assert!(timed_out.is_err());

        // 失败的加载在无人等待时结束，下一次调用直接重试
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!cache.is_loaded());

        let bank = assert_ok!(cache.load().await);
        assert_eq!(source.fetches(), 2);
        assert_eq!(bank.questions().len(), 3);
    }

    #[tokio::test]
    async fn test_missing_sheet_is_malformed_schema() {
        let sheets = vec![(
            "questions".to_string(),
            vec![vec![Cell::from("id_question"), Cell::from("question")]],
        )];
        let source = CountingSource::new(build_xlsx(&sheets), Duration::ZERO, 0);
        let cache = cache_for(&source);

        let err = assert_err!(cache.load().await);
        assert_eq!(err, BankError::missing_sheet("tests"));
    }

    #[tokio::test]
    async fn test_loaded_bank_content() {
        let source = counting(Duration::ZERO, 0);
        let cache = cache_for(&source);

        let bank = assert_ok!(cache.load().await);

        assert_eq!(bank.test_ids(), vec![Key::from("T1"), Key::from("T2")]);
        assert_eq!(
            bank.get(&Key::Int(2)).map(|q| q.text.as_str()),
            Some("¿Cuántos pianos hay en Madrid?")
        );
        assert!(cache.peek().is_some());
    }
}
