use super::chain::{ApprovalChain, ApprovalStageSpec};
use super::error::WorkflowError;
use super::finance::{ExpenseBudgets, WhtSchedule};
use anyhow::Result;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Runtime configuration for the requisition workflow
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct PortalConfig {
    /// Directory of the sled database holding requisitions
    pub database_path: String,
    /// Default tracing filter, overridden by RUST_LOG
    pub log_level: String,
    /// Selectable withholding tax rates, whole percent
    pub wht_rates: Vec<u8>,
    /// Approval stages in routing order
    pub approval_chain: Vec<StageConfig>,
    /// Expense lines a requisition may be booked against
    pub expense_lines: Vec<ExpenseLineConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct StageConfig {
    pub role_name: String,
    pub department: String,
    pub grade_level: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ExpenseLineConfig {
    pub name: String,
    /// Minor units (kobo)
    pub budgeted_amount: i64,
}

fn stage(role_name: &str, department: &str, grade_level: &str) -> StageConfig {
    StageConfig {
        role_name: role_name.to_string(),
        department: department.to_string(),
        grade_level: grade_level.to_string(),
    }
}

fn line(name: &str, naira: i64) -> ExpenseLineConfig {
    ExpenseLineConfig {
        name: name.to_string(),
        budgeted_amount: naira * 100,
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            database_path: "requisitions.db".to_string(),
            log_level: "info".to_string(),
            wht_rates: vec![0, 5, 10, 15],
            approval_chain: vec![
                stage("Admin Manager", "Administration", "Manager"),
                stage("HR Manager", "HR", "Manager"),
                stage("Finance Manager", "Finance", "Manager"),
                stage("MD", "Executive", "MD"),
            ],
            expense_lines: vec![
                line("Office Repairs and Maintenance", 1_000_000),
                line("Equipment Maintenance", 500_000),
                line("Regulatory Maintenance", 750_000),
                line("Electricity", 6_000_000),
                line("Cleaning & Pest Control", 2_500_000),
                line("Fleet Management", 5_000_000),
                line("Subscriptions", 1_000_000),
                line("Rent", 2_500_000),
                line("Fuel and Lubrication", 4_500_000),
                line("Plant & Machinery Maintenance", 450_000),
                line("Printing & Stationeries", 1_200_000),
                line("Insurance", 7_500_000),
                line("Internet Subscription", 2_500_000),
                line("IT Equipment Maintenance", 5_000_000),
            ],
        }
    }
}

impl PortalConfig {
    /// Load configuration with precedence:
    /// 1. Default values
    /// 2. The TOML file at `path`, if given and present
    /// 3. Environment variables (prefixed with REQUISITION__)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
        }

        builder = builder.add_source(
            Environment::with_prefix("REQUISITION")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from_str(contents, FileFormat::Toml))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    pub fn approval_chain(&self) -> Result<ApprovalChain, WorkflowError> {
        ApprovalChain::new(
            self.approval_chain
                .iter()
                .map(|s| ApprovalStageSpec::new(&s.role_name, &s.department, &s.grade_level))
                .collect(),
        )
    }

    pub fn expense_budgets(&self) -> ExpenseBudgets {
        self.expense_lines
            .iter()
            .map(|l| (l.name.clone(), l.budgeted_amount))
            .collect()
    }

    pub fn wht_schedule(&self) -> Result<WhtSchedule, WorkflowError> {
        WhtSchedule::new(self.wht_rates.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_mirror_the_portal() {
        let config = PortalConfig::default();
        let chain = config.approval_chain().unwrap();

        assert_eq!(chain.len(), 4);
        assert_eq!(chain.stage_at(3).unwrap().role_name, "MD");
        assert_eq!(config.expense_budgets().budget_for("Rent"), Some(250_000_000));
        assert!(config.wht_schedule().unwrap().contains(15));
    }

    #[test]
    fn file_values_override_defaults() {
        let config = PortalConfig::from_toml_str(
            r#"
            database_path = "/tmp/reqs"
            wht_rates = [0, 10]

            [[approval_chain]]
            role_name = "Finance Manager"
            department = "Finance"
            grade_level = "Manager"
            "#,
        )
        .unwrap();

        assert_eq!(config.database_path, "/tmp/reqs");
        assert_eq!(config.approval_chain().unwrap().len(), 1);
        assert!(!config.wht_schedule().unwrap().contains(5));
        // untouched keys keep their defaults
        assert_eq!(config.log_level, "info");
        assert_eq!(config.expense_lines.len(), 14);
    }

    #[test]
    fn rates_above_hundred_are_refused() {
        let config = PortalConfig::from_toml_str("wht_rates = [0, 5, 150]").unwrap();
        assert!(config.wht_schedule().is_err());
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("requisition.toml");
        let config = PortalConfig::default();

        config.save_to_file(&path).unwrap();
        let loaded = PortalConfig::load(Some(&path)).unwrap();

        assert_eq!(loaded.approval_chain, config.approval_chain);
        assert_eq!(loaded.expense_lines, config.expense_lines);
    }
}
