//! 随机抽题服务
//!
//! 在候选集合上均匀抽取，每次调用相互独立，不记录已抽过的题目。

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{BankError, BankResult};
use crate::models::{Question, QuestionBank};

/// 从全部题目中随机抽取一道
pub fn random_question<'a, R: Rng + ?Sized>(
    bank: &'a QuestionBank,
    rng: &mut R,
) -> BankResult<&'a Question> {
    bank.questions()
        .choose(rng)
        .ok_or(BankError::EmptyBank { pool: "题目" })
}

/// 从 play 题目（不属于任何测试的题目）中随机抽取一道
pub fn random_play_question<'a, R: Rng + ?Sized>(
    bank: &'a QuestionBank,
    rng: &mut R,
) -> BankResult<&'a Question> {
    bank.play_questions()
        .choose(rng)
        .ok_or(BankError::EmptyBank { pool: "play 题目" })
}
