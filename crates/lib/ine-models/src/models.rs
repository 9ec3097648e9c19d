use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Statistical operation (survey or series family) from the upstream catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Operation {
    #[serde(rename = "Id")]
    pub id: u64,
    #[serde(rename = "Codigo", deserialize_with = "lenient::string")]
    pub code: String,
    #[serde(rename = "Nombre")]
    pub name: String,
    #[serde(rename = "Cod_IOE", default, deserialize_with = "lenient::optional_string")]
    pub ioe_code: Option<String>,
    #[serde(rename = "Url", default)]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Dataset published under an operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Table {
    #[serde(rename = "Id")]
    pub id: u64,
    #[serde(rename = "Nombre")]
    pub name: String,
    #[serde(rename = "Codigo", default, deserialize_with = "lenient::string")]
    pub code: String,
    #[serde(rename = "FK_Periodicidad", default)]
    pub periodicity: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One observation of a series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataPoint {
    /// Unix epoch milliseconds.
    #[serde(rename = "Fecha", deserialize_with = "lenient::epoch_millis")]
    pub date: i64,
    /// `None` for missing or suppressed observations.
    #[serde(rename = "Valor", default)]
    pub value: Option<f64>,
    #[serde(rename = "Anyo", default)]
    pub year: Option<i32>,
    #[serde(rename = "FK_Periodo", default)]
    pub period: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Indexed time series with its observations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Series {
    #[serde(rename = "COD")]
    pub code: String,
    #[serde(rename = "Nombre", default)]
    pub name: String,
    #[serde(rename = "FK_Unidad", default)]
    pub unit: Option<u64>,
    #[serde(rename = "FK_Escala", default)]
    pub scale: Option<u64>,
    #[serde(rename = "FK_Periodicidad", default)]
    pub periodicity: Option<u32>,
    #[serde(rename = "Data", default)]
    pub data: Vec<DataPoint>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Selection variable (upstream "group") of a table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Variable {
    #[serde(rename = "Id")]
    pub id: u64,
    #[serde(rename = "Nombre")]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One value a table variable can take.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VariableValue {
    #[serde(rename = "Id")]
    pub id: u64,
    #[serde(rename = "Nombre")]
    pub name: String,
    #[serde(rename = "Codigo", default, deserialize_with = "lenient::string")]
    pub code: String,
    #[serde(rename = "Fk_Variable", default)]
    pub variable_id: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Which namespace a search hit came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Operation,
    Table,
}

/// Field a search query matched against.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MatchedField {
    Codigo,
    Nombre,
}

/// Operation or table record matched by a free-text search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResult {
    pub kind: EntityKind,
    pub matched_field: MatchedField,
    /// Code of the operation the hit belongs to (the operation itself for
    /// operation hits).
    pub operation: String,
    #[serde(rename = "Id")]
    pub id: u64,
    #[serde(rename = "Codigo")]
    pub code: String,
    #[serde(rename = "Nombre")]
    pub name: String,
    #[serde(rename = "FK_Periodicidad")]
    pub periodicity: Option<u32>,
}

impl SearchResult {
    #[must_use]
    pub fn from_operation(operation: &Operation, matched_field: MatchedField) -> Self {
        Self {
            kind: EntityKind::Operation,
            matched_field,
            operation: operation.code.clone(),
            id: operation.id,
            code: operation.code.clone(),
            name: operation.name.clone(),
            periodicity: None,
        }
    }

    #[must_use]
    pub fn from_table(operation_code: &str, table: &Table, matched_field: MatchedField) -> Self {
        Self {
            kind: EntityKind::Table,
            matched_field,
            operation: operation_code.to_string(),
            id: table.id,
            code: table.code.clone(),
            name: table.name.clone(),
            periodicity: table.periodicity,
        }
    }
}

/// Compact summary of the most recent observation of one series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LatestRecord {
    pub table_id: u64,
    pub table_name: String,
    #[serde(rename = "COD")]
    pub series_code: String,
    #[serde(rename = "Nombre")]
    pub series_name: String,
    #[serde(rename = "Fecha")]
    pub date: i64,
    #[serde(rename = "Valor")]
    pub value: Option<f64>,
    #[serde(rename = "Anyo")]
    pub year: Option<i32>,
}

impl LatestRecord {
    /// Builds a summary from the most recent observation, if the series has any.
    #[must_use]
    pub fn from_series(table: &Table, series: &Series) -> Option<Self> {
        let point = series.latest()?;
        Some(Self {
            table_id: table.id,
            table_name: table.name.clone(),
            series_code: series.code.clone(),
            series_name: series.name.clone(),
            date: point.date,
            value: point.value,
            year: point.year,
        })
    }
}

/// Result of resolving a single series code.
///
/// Serialized untagged: either the series itself or `{"error": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SeriesLookup {
    Found(Box<Series>),
    Missing { error: String },
}

impl SeriesLookup {
    #[must_use]
    pub fn missing(code: &str) -> Self {
        Self::Missing {
            error: format!("series not found: {code}"),
        }
    }

    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// Chronological direction of a `Data` sequence as returned upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataOrder {
    Ascending,
    Descending,
}

impl DataOrder {
    /// Detects the order from the first and last `Fecha`. Sequences with fewer
    /// than two distinct dates are treated as most-recent-first.
    #[must_use]
    pub fn detect(points: &[DataPoint]) -> Self {
        match (points.first(), points.last()) {
            (Some(first), Some(last)) if first.date < last.date => Self::Ascending,
            _ => Self::Descending,
        }
    }
}

impl Series {
    #[must_use]
    pub fn data_order(&self) -> DataOrder {
        DataOrder::detect(&self.data)
    }

    /// Most recent observation regardless of upstream ordering.
    #[must_use]
    pub fn latest(&self) -> Option<&DataPoint> {
        match self.data_order() {
            DataOrder::Ascending => self.data.last(),
            DataOrder::Descending => self.data.first(),
        }
    }

    /// Keeps the `count` most recent observations, preserving upstream order.
    pub fn truncate_to_latest(&mut self, count: usize) {
        if self.data.len() <= count {
            return;
        }
        match self.data_order() {
            DataOrder::Ascending => {
                let start = self.data.len() - count;
                self.data.drain(..start);
            }
            DataOrder::Descending => self.data.truncate(count),
        }
    }
}

/// Deserializers tolerant of the loose typing in upstream payloads.
mod lenient {
    use chrono::DateTime;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(optional_string(deserializer)?.unwrap_or_default())
    }

    pub fn optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(value)) => Ok(Some(value)),
            Some(Value::Number(value)) => Ok(Some(value.to_string())),
            Some(other) => Err(D::Error::custom(format!(
                "expected string or number, found {other}"
            ))),
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn epoch_millis<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Number(value) => value
                .as_i64()
                .or_else(|| value.as_f64().map(|float| float as i64))
                .ok_or_else(|| D::Error::custom(format!("invalid Fecha: {value}"))),
            Value::String(value) => parse_fecha(&value)
                .ok_or_else(|| D::Error::custom(format!("invalid Fecha: {value}"))),
            other => Err(D::Error::custom(format!("invalid Fecha: {other}"))),
        }
    }

    fn parse_fecha(raw: &str) -> Option<i64> {
        let trimmed = raw.trim();
        if let Ok(millis) = trimmed.parse::<i64>() {
            return Some(millis);
        }
        DateTime::parse_from_rfc3339(trimmed)
            .ok()
            .map(|parsed| parsed.timestamp_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn point(date: i64, value: f64) -> DataPoint {
        DataPoint {
            date,
            value: Some(value),
            year: None,
            period: None,
            extra: Map::new(),
        }
    }

    fn series_with(points: Vec<DataPoint>) -> Series {
        Series {
            code: "IPC251856".to_string(),
            name: "Total Nacional. Índice general.".to_string(),
            unit: Some(133),
            scale: Some(1),
            periodicity: Some(1),
            data: points,
            extra: Map::new(),
        }
    }

    #[test]
    fn operation_keeps_unknown_upstream_fields() {
        let raw = json!({
            "Id": 25,
            "Cod_IOE": "30138",
            "Nombre": "Índice de Precios de Consumo (IPC)",
            "Codigo": "IPC",
            "Url": "https://www.ine.es/dyngs/INEbase/operacion.htm?c=Estadistica_C",
            "Extra": 7
        });
        let operation: Operation = serde_json::from_value(raw).expect("operation should decode");
        assert_eq!(operation.code, "IPC");
        assert_eq!(operation.ioe_code.as_deref(), Some("30138"));
        assert_eq!(operation.extra.get("Extra"), Some(&json!(7)));

        let encoded = serde_json::to_value(&operation).expect("operation should encode");
        assert_eq!(encoded["Extra"], json!(7));
        assert_eq!(encoded["Codigo"], json!("IPC"));
    }

    #[test]
    fn table_tolerates_numeric_and_null_codes() {
        let numeric: Table = serde_json::from_value(json!({
            "Id": 25171, "Nombre": "Índices por CCAA", "Codigo": 42, "FK_Periodicidad": 3
        }))
        .expect("numeric code should decode");
        assert_eq!(numeric.code, "42");

        let missing: Table =
            serde_json::from_value(json!({"Id": 1, "Nombre": "Sin código", "Codigo": null}))
                .expect("null code should decode");
        assert_eq!(missing.code, "");
        assert_eq!(missing.periodicity, None);
    }

    #[test]
    fn data_point_accepts_epoch_and_rfc3339_dates() {
        let epoch: DataPoint =
            serde_json::from_value(json!({"Fecha": 1_704_063_600_000_i64, "Valor": 1.5}))
                .expect("epoch date should decode");
        assert_eq!(epoch.date, 1_704_063_600_000);

        let text: DataPoint = serde_json::from_value(
            json!({"Fecha": "2024-01-01T00:00:00.000+01:00", "Valor": null}),
        )
        .expect("rfc3339 date should decode");
        assert_eq!(text.date, 1_704_063_600_000);
        assert_eq!(text.value, None);
    }

    #[test]
    fn truncates_descending_data_from_the_front() {
        let mut series = series_with(vec![point(300, 3.0), point(200, 2.0), point(100, 1.0)]);
        series.truncate_to_latest(2);
        let dates: Vec<i64> = series.data.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![300, 200]);
    }

    #[test]
    fn truncates_ascending_data_from_the_back() {
        let mut series = series_with(vec![point(100, 1.0), point(200, 2.0), point(300, 3.0)]);
        series.truncate_to_latest(2);
        let dates: Vec<i64> = series.data.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![200, 300]);
        assert_eq!(series.latest().map(|p| p.date), Some(300));
    }

    #[test]
    fn latest_record_uses_most_recent_point() {
        let table = Table {
            id: 50902,
            name: "Índices nacionales".to_string(),
            code: String::new(),
            periodicity: Some(1),
            extra: Map::new(),
        };
        let series = series_with(vec![point(100, 1.0), point(200, 2.0)]);
        let record = LatestRecord::from_series(&table, &series).expect("record expected");
        assert_eq!(record.date, 200);
        assert_eq!(record.value, Some(2.0));

        let empty = series_with(Vec::new());
        assert!(LatestRecord::from_series(&table, &empty).is_none());
    }

    #[test]
    fn missing_series_serializes_as_error_only() {
        let encoded = serde_json::to_value(SeriesLookup::missing("XYZ")).expect("encode");
        assert_eq!(encoded, json!({"error": "series not found: XYZ"}));

        let found = SeriesLookup::Found(Box::new(series_with(vec![point(1, 1.0)])));
        let encoded = serde_json::to_value(&found).expect("encode");
        assert_eq!(encoded["COD"], json!("IPC251856"));
        assert!(encoded.get("error").is_none());
    }
}
