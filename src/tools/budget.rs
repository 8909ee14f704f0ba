//! Budget and savings-goal arithmetic.

use crate::models::{BudgetPlan, SavingsGoal};

/// Share of income treated as fixed costs.
pub const FIXED_SHARE: f64 = 0.50;
/// Share of income treated as variable costs.
pub const VARIABLE_SHARE: f64 = 0.30;

pub const SAVINGS_TIP: &str = "Automate saving via SIP/RD so you don't miss months.";

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Savings left after fixed and variable costs. A zero income yields a
/// savings rate of 0 rather than a division fault.
pub fn budget_plan(income: f64, fixed: f64, variable: f64) -> BudgetPlan {
    let savings = income - (fixed + variable);
    let rate = if income == 0.0 {
        0.0
    } else {
        savings / income * 100.0
    };

    BudgetPlan {
        income,
        fixed_costs: fixed,
        variable_costs: variable,
        savings_possible: savings,
        savings_rate_percent: round2(rate),
    }
}

/// Apply the fixed 50/30 split to `income` and compute the plan.
pub fn split_budget(income: u64) -> BudgetPlan {
    let income = income as f64;
    let fixed = (income * FIXED_SHARE).round();
    let variable = (income * VARIABLE_SHARE).round();
    budget_plan(income, fixed, variable)
}

/// Monthly amount needed to reach `goal_amount` in `months`.
/// `None` when `months` is zero.
pub fn savings_goal(goal_amount: u64, months: u32) -> Option<SavingsGoal> {
    if months == 0 {
        return None;
    }
    Some(SavingsGoal {
        goal_amount,
        months,
        monthly_saving_required: round2(goal_amount as f64 / months as f64),
        tip: SAVINGS_TIP.to_string(),
    })
}
