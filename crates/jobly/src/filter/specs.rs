use super::{FilterRule, FilterSpec, RangeCheck};

/// Company search: `name`, `minEmployees`, `maxEmployees`.
pub const COMPANY_FILTERS: FilterSpec = FilterSpec {
    entity: "companies",
    rules: &[
        FilterRule::contains("name", "name"),
        FilterRule::at_least("minEmployees", "num_employees"),
        FilterRule::at_most("maxEmployees", "num_employees"),
    ],
    range_checks: &[RangeCheck {
        min_key: "minEmployees",
        max_key: "maxEmployees",
    }],
};

/// Job search: `title`, `minSalary`, `hasEquity`.
pub const JOB_FILTERS: FilterSpec = FilterSpec {
    entity: "jobs",
    rules: &[
        FilterRule::contains("title", "title"),
        FilterRule::at_least("minSalary", "salary"),
        FilterRule::flag_above("hasEquity", "equity", 0),
    ],
    range_checks: &[],
};
