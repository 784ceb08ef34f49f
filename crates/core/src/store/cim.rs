//! Structured store backed by PowerShell CIM cmdlets (Windows).

use std::process::Command;

use super::StructuredStore;
use crate::error::StoreError;
use crate::value::TypedValue;

/// Exit code the scripts use when the class has no instance.
const NO_INSTANCE_EXIT: i32 = 2;

/// Reads and updates instances with `Get-CimInstance` / `Set-CimInstance`.
#[derive(Debug, Clone)]
pub struct PowerShellCimStore {
    program: String,
}

impl Default for PowerShellCimStore {
    fn default() -> Self {
        Self {
            program: "powershell.exe".to_string(),
        }
    }
}

impl PowerShellCimStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, script: &str) -> Result<(Option<i32>, String, String), StoreError> {
        let output = Command::new(&self.program)
            .args([
                "-NoProfile",
                "-NonInteractive",
                "-ExecutionPolicy",
                "Bypass",
                "-Command",
                script,
            ])
            .output()
            .map_err(|source| StoreError::Launch {
                program: self.program.clone(),
                source,
            })?;
        Ok((
            output.status.code(),
            String::from_utf8_lossy(&output.stdout).into_owned(),
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ))
    }
}

/// Single-quoted PowerShell string literal.
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// PowerShell expression producing `value`.
fn literal(value: &TypedValue) -> String {
    match value {
        TypedValue::Null => "$null".to_string(),
        TypedValue::Boolean(true) => "$true".to_string(),
        TypedValue::Boolean(false) => "$false".to_string(),
        TypedValue::Number(n) => format!(
            "[double]::Parse({}, [cultureinfo]::InvariantCulture)",
            quote(&n.to_string())
        ),
        TypedValue::String(s) => quote(s),
        TypedValue::DateTime(ts) => format!(
            "[System.Management.ManagementDateTimeConverter]::ToDateTime({})",
            quote(&ts.to_cim())
        ),
    }
}

fn select_instance(namespace: &str, class_name: &str) -> String {
    format!(
        "$i = Get-CimInstance -Namespace {} -ClassName {} -ErrorAction Stop \
         | Select-Object -First 1; ",
        quote(namespace),
        quote(class_name)
    )
}

fn properties_script(namespace: &str, class_name: &str) -> String {
    format!(
        "{}if (-not $i) {{ exit {NO_INSTANCE_EXIT} }}; \
         $i.CimInstanceProperties | ForEach-Object {{ $_.Name }}",
        select_instance(namespace, class_name)
    )
}

fn set_script(namespace: &str, class_name: &str, property: &str, value: &TypedValue) -> String {
    format!(
        "{}if (-not $i) {{ exit {NO_INSTANCE_EXIT} }}; \
         Set-CimInstance -InputObject $i -Property @{{ {} = {} }} -ErrorAction Stop",
        select_instance(namespace, class_name),
        quote(property),
        literal(value)
    )
}

impl StructuredStore for PowerShellCimStore {
    fn instance_properties(
        &self,
        namespace: &str,
        class_name: &str,
    ) -> Result<Option<Vec<String>>, StoreError> {
        let (code, stdout, stderr) = self.run(&properties_script(namespace, class_name))?;
        match code {
            Some(0) => Ok(Some(
                stdout
                    .lines()
                    .map(str::trim)
                    .filter(|name| !name.is_empty() && !name.starts_with("__"))
                    .map(str::to_string)
                    .collect(),
            )),
            Some(NO_INSTANCE_EXIT) => Ok(None),
            _ => Err(StoreError::Command { message: stderr }),
        }
    }

    fn set_property(
        &mut self,
        namespace: &str,
        class_name: &str,
        property: &str,
        value: &TypedValue,
    ) -> Result<(), StoreError> {
        let (code, _, stderr) = self.run(&set_script(namespace, class_name, property, value))?;
        match code {
            Some(0) => Ok(()),
            Some(NO_INSTANCE_EXIT) => Err(StoreError::InstanceNotFound {
                namespace: namespace.to_string(),
                class_name: class_name.to_string(),
            }),
            _ => Err(StoreError::Command { message: stderr }),
        }
    }
}
