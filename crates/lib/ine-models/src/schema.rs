pub const DEFAULT_BASE_URL: &str = "https://servicios.ine.es/wstempus/js";
pub const DEFAULT_LANGUAGE: &str = "ES";

pub const FN_OPERATIONS: &str = "OPERACIONES_DISPONIBLES";
pub const FN_OPERATION_TABLES: &str = "TABLAS_OPERACION";
pub const FN_TABLE_DATA: &str = "DATOS_TABLA";
pub const FN_SERIES_DATA: &str = "DATOS_SERIE";
pub const FN_TABLE_GROUPS: &str = "GRUPOS_TABLA";
pub const FN_TABLE_GROUP_VALUES: &str = "VALORES_GRUPOSTABLA";

pub const PARAM_LAST_PERIODS: &str = "nult";
pub const PARAM_DETAIL: &str = "det";
pub const PARAM_DATE: &str = "date";
pub const PARAM_PERIODICITY: &str = "p";

pub const MAX_DETAIL_LEVEL: u8 = 2;

/// Builds the path below `{base}/{language}` for an upstream function call.
#[must_use]
pub fn function_path(function: &str, inputs: &[&str]) -> String {
    let mut path = function.to_string();
    for input in inputs {
        path.push('/');
        path.push_str(input);
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_inputs_with_slashes() {
        assert_eq!(function_path(FN_OPERATIONS, &[]), "OPERACIONES_DISPONIBLES");
        assert_eq!(
            function_path(FN_TABLE_GROUP_VALUES, &["50902", "1"]),
            "VALORES_GRUPOSTABLA/50902/1"
        );
    }
}
