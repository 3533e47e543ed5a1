use serde::Serialize;

use super::types::CalcError;

/// Highest achievable questionnaire score (every question answered with its
/// top-scoring option).
pub const RISK_MAX_SCORE: u32 = 60;

/// Band thresholds over the total score. The questionnaire floor is 6, so
/// the conservative band is 6..=20, moderate 21..=40, aggressive 41..=60.
pub const RISK_CONSERVATIVE_MAX: u32 = 20;
pub const RISK_MODERATE_MAX: u32 = 40;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RiskOption {
    pub text: &'static str,
    pub score: u32,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskQuestion {
    pub id: u32,
    pub question: &'static str,
    pub options: &'static [RiskOption],
}

/// The compliance scoring questionnaire, in presentation order.
pub const RISK_QUESTIONS: &[RiskQuestion] = &[
    RiskQuestion {
        id: 1,
        question: "Q1. What is your current age?",
        options: &[
            RiskOption { text: "A) Less than 30 years", score: 10 },
            RiskOption { text: "B) 31 to 45 years", score: 7 },
            RiskOption { text: "C) 46 to 60 years", score: 5 },
            RiskOption { text: "D) Above 60 years", score: 1 },
        ],
    },
    RiskQuestion {
        id: 2,
        question: "Q2. When do you need to withdraw this money (Investment Horizon)?",
        options: &[
            RiskOption { text: "A) In less than 1 year", score: 1 },
            RiskOption { text: "B) In 1 to 3 years", score: 3 },
            RiskOption { text: "C) In 3 to 7 years", score: 7 },
            RiskOption { text: "D) More than 7 years", score: 10 },
        ],
    },
    RiskQuestion {
        id: 3,
        question: "Q3. Which statement best describes your investment knowledge?",
        options: &[
            RiskOption { text: "A) I have no knowledge; I rely completely on advice.", score: 1 },
            RiskOption { text: "B) I have basic knowledge of savings (FDs, RDs).", score: 3 },
            RiskOption { text: "C) I understand mutual funds and stock markets moderately.", score: 7 },
            RiskOption { text: "D) I am an experienced investor (Stocks, F&O, AIF).", score: 10 },
        ],
    },
    RiskQuestion {
        id: 4,
        question: "Q4. Imagine the market crashes and your portfolio drops by 20% in one month. What would you do?",
        options: &[
            RiskOption { text: "A) Panic and withdraw everything immediately.", score: 1 },
            RiskOption { text: "B) Worry, but wait for a few months.", score: 5 },
            RiskOption { text: "C) Do nothing; I understand markets go up and down.", score: 7 },
            RiskOption { text: "D) Invest more money to buy at lower prices.", score: 10 },
        ],
    },
    RiskQuestion {
        id: 5,
        question: "Q5. What is your primary goal for this investment?",
        options: &[
            RiskOption { text: "A) Capital Protection (No principal loss).", score: 1 },
            RiskOption { text: "B) Regular Income with slight growth.", score: 3 },
            RiskOption { text: "C) Wealth Accumulation (Balance of risk and growth).", score: 7 },
            RiskOption { text: "D) Aggressive Growth (Maximizing returns long term).", score: 10 },
        ],
    },
    RiskQuestion {
        id: 6,
        question: "Q6. What percentage of your monthly income do you save?",
        options: &[
            RiskOption { text: "A) Less than 10%", score: 1 },
            RiskOption { text: "B) 10% to 25%", score: 5 },
            RiskOption { text: "C) 25% to 50%", score: 7 },
            RiskOption { text: "D) More than 50%", score: 10 },
        ],
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskBand {
    Conservative,
    Moderate,
    Aggressive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub score: u32,
    pub max_score: u32,
    pub band: RiskBand,
}

/// Scores a completed questionnaire. `answers` holds the chosen option index
/// for each question, in question order.
pub fn assess_risk_profile(answers: &[usize]) -> Result<RiskAssessment, CalcError> {
    if answers.len() != RISK_QUESTIONS.len() {
        return Err(CalcError::invalid(format!(
            "expected {} answers, got {}",
            RISK_QUESTIONS.len(),
            answers.len()
        )));
    }

    let mut score = 0;
    for (question, &choice) in RISK_QUESTIONS.iter().zip(answers) {
        let Some(option) = question.options.get(choice) else {
            return Err(CalcError::invalid(format!(
                "question {} has no option index {choice}",
                question.id
            )));
        };
        score += option.score;
    }

    let band = if score <= RISK_CONSERVATIVE_MAX {
        RiskBand::Conservative
    } else if score <= RISK_MODERATE_MAX {
        RiskBand::Moderate
    } else {
        RiskBand::Aggressive
    };

    Ok(RiskAssessment {
        score,
        max_score: RISK_MAX_SCORE,
        band,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_table_is_consistent_with_max_score() {
        let max_total: u32 = RISK_QUESTIONS
            .iter()
            .map(|q| q.options.iter().map(|o| o.score).max().unwrap_or(0))
            .sum();
        assert_eq!(max_total, RISK_MAX_SCORE);
        assert_eq!(RISK_QUESTIONS.len(), 6);
        for question in RISK_QUESTIONS {
            assert_eq!(question.options.len(), 4);
        }
    }

    #[test]
    fn top_scoring_answers_land_in_the_aggressive_band() {
        let answers: Vec<usize> = RISK_QUESTIONS
            .iter()
            .map(|q| {
                q.options
                    .iter()
                    .enumerate()
                    .max_by_key(|(_, o)| o.score)
                    .map(|(idx, _)| idx)
                    .expect("questions have options")
            })
            .collect();
        let assessment = assess_risk_profile(&answers).expect("valid answers");
        assert_eq!(assessment.score, RISK_MAX_SCORE);
        assert_eq!(assessment.band, RiskBand::Aggressive);
    }

    #[test]
    fn bottom_scoring_answers_land_in_the_conservative_band() {
        let answers: Vec<usize> = RISK_QUESTIONS
            .iter()
            .map(|q| {
                q.options
                    .iter()
                    .enumerate()
                    .min_by_key(|(_, o)| o.score)
                    .map(|(idx, _)| idx)
                    .expect("questions have options")
            })
            .collect();
        let assessment = assess_risk_profile(&answers).expect("valid answers");
        assert_eq!(assessment.score, 6);
        assert_eq!(assessment.band, RiskBand::Conservative);
    }

    #[test]
    fn mid_range_score_is_moderate() {
        // C answers throughout: 5 + 7 + 7 + 7 + 7 + 7 = 40.
        let assessment = assess_risk_profile(&[2, 2, 2, 2, 2, 2]).expect("valid answers");
        assert_eq!(assessment.score, 40);
        assert_eq!(assessment.band, RiskBand::Moderate);
    }

    #[test]
    fn rejects_wrong_answer_count_and_out_of_range_choice() {
        assert!(assess_risk_profile(&[0, 1, 2]).is_err());
        assert!(assess_risk_profile(&[0, 1, 2, 3, 0, 4]).is_err());
    }
}
