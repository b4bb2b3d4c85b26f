/// 题库服务
///
/// 对外暴露的全部读取操作。每个操作都先经过缓存（首次调用触发加载），
/// 之后的组卷和抽题都是对不可变数据的同步读取。
use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::config::Config;
use crate::error::BankResult;
use crate::logger;
use crate::models::{Question, QuestionBank, TestId};
use crate::services::bank_cache::QuestionBankCache;
use crate::services::sampler;
use crate::services::test_assembler::{assemble_test, TestAssembly};
use crate::utils::logging::truncate_text;

/// 题库服务
pub struct QuestionBankService {
    cache: QuestionBankCache,
}

impl QuestionBankService {
    pub fn new(cache: QuestionBankCache) -> Self {
        Self { cache }
    }

    /// 根据配置创建服务
    pub fn from_config(config: &Config) -> Self {
        Self::new(QuestionBankCache::new(
            config.workbook_source(),
            config.schema.clone(),
        ))
    }

    /// 进程级共享实例，配置来自环境变量；首次调用时按配置初始化日志
    pub fn global() -> &'static QuestionBankService {
        static GLOBAL: OnceLock<QuestionBankService> = OnceLock::new();
        GLOBAL.get_or_init(|| {
            let config = Config::from_env();
            logger::init_from_config(&config);
            Self::from_config(&config)
        })
    }

    /// 加载（或获取已缓存的）题库
    pub async fn bank(&self) -> BankResult<Arc<QuestionBank>> {
        self.cache.load().await
    }

    /// 全部题目，按工作表顺序
    pub async fn get_all_questions(&self) -> BankResult<Vec<Question>> {
        Ok(self.bank().await?.questions().to_vec())
    }

    /// 测试的题目，按测试定义顺序；未知测试返回空列表
    pub async fn get_test_questions(
        &self,
        test_id: impl Into<TestId>,
    ) -> BankResult<Vec<Question>> {
        Ok(self.get_test_questions_detailed(test_id).await?.into_questions())
    }

    /// 同 `get_test_questions`，同时返回诊断信息
    pub async fn get_test_questions_detailed(
        &self,
        test_id: impl Into<TestId>,
    ) -> BankResult<TestAssembly> {
        let test_id = test_id.into();
        let bank = self.bank().await?;
        Ok(assemble_test(&bank, &test_id))
    }

    /// 随机一道题
    pub async fn get_random_question(&self) -> BankResult<Question> {
        let bank = self.bank().await?;
        let mut rng = rand::thread_rng();
        let question = sampler::random_question(&bank, &mut rng)?;
        debug!("🎲 随机题目 {}: {}", question.id, truncate_text(&question.text, 40));
        Ok(question.clone())
    }

    /// 随机一道不属于任何测试的题
    pub async fn get_random_play_question(&self) -> BankResult<Question> {
        let bank = self.bank().await?;
        let mut rng = rand::thread_rng();
        let question = sampler::random_play_question(&bank, &mut rng)?;
        debug!("🎲 随机 play 题目 {}: {}", question.id, truncate_text(&question.text, 40));
        Ok(question.clone())
    }

    /// 所有测试 ID，已排序
    pub async fn get_available_tests(&self) -> BankResult<Vec<TestId>> {
        Ok(self.bank().await?.test_ids())
    }
}
