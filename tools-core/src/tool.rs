//! Tool descriptors and tool-call dispatch.
//!
//! Exposes [`current_time`](crate::clock::current_time) and
//! [`WeatherProvider::get_weather`] as named functions an assistant can call.
//! Models emit calls in several shapes; [`ToolCall::parse_all`] accepts:
//!
//! - `{"name": "get_weather", "arguments": {"city": "Paris"}}` (or `"parameters"`),
//!   or a JSON array of such objects
//! - `<|python_tag|>get_weather.call(city="Paris")`
//! - `functools[{"name": "get_weather", "arguments": {"city": "Paris"}}]`
//! - `<|tool_call_start|>[get_weather(city="Paris")]<|tool_call_end|>`
//! - `<tool_call>{"name": "get_weather", "arguments": {"city": "Paris"}}</tool_call>`
//! - plain call syntax, `get_weather(city="Paris"), get_current_time()`

use serde_json::{Map, Value, json};

use crate::{clock, error::ToolError, provider::WeatherProvider};

pub const GET_CURRENT_TIME: &str = "get_current_time";
pub const GET_WEATHER: &str = "get_weather";

const PYTHON_TAG: &str = "<|python_tag|>";
const FUNCTOOLS_OPEN: &str = "functools[";
const CALL_START: &str = "<|tool_call_start|>";
const CALL_END: &str = "<|tool_call_end|>";
const XML_OPEN: &str = "<tool_call>";
const XML_CLOSE: &str = "</tool_call>";

#[derive(Debug, Clone, PartialEq)]
pub struct ToolParam {
    pub name: String,
    /// JSON-schema type, e.g. "string".
    pub kind: String,
    pub description: String,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tool {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ToolParam>,
}

impl Tool {
    /// Function-calling schema for this tool.
    pub fn to_json(&self) -> Value {
        let properties: Map<String, Value> = self
            .parameters
            .iter()
            .map(|p| {
                let schema = json!({ "type": p.kind, "description": p.description });
                (p.name.clone(), schema)
            })
            .collect();

        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": {
                    "type": "object",
                    "properties": properties,
                    "required": required
                }
            }
        })
    }
}

pub fn builtin_tools() -> Vec<Tool> {
    vec![
        Tool {
            name: GET_CURRENT_TIME.to_string(),
            description: "Get the current local date and time".to_string(),
            parameters: Vec::new(),
        },
        Tool {
            name: GET_WEATHER.to_string(),
            description: "Get current weather for a location".to_string(),
            parameters: vec![ToolParam {
                name: "city".to_string(),
                kind: "string".to_string(),
                description: "Name of the city or place".to_string(),
                required: true,
            }],
        },
    ]
}

/// A parsed request to run one tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub name: String,
    pub arguments: Map<String, Value>,
}

impl ToolCall {
    /// Parses text holding exactly one tool call.
    pub fn parse(text: &str) -> Result<Self, ToolError> {
        let mut calls = Self::parse_all(text)?;
        if calls.len() != 1 {
            return Err(ToolError::ToolCall(format!(
                "expected one tool call, found {}",
                calls.len()
            )));
        }
        Ok(calls.remove(0))
    }

    /// Parses every tool call in `text`, in order.
    pub fn parse_all(text: &str) -> Result<Vec<Self>, ToolError> {
        let trimmed = text.trim();

        let calls = if let Some(rest) = after(trimmed, PYTHON_TAG) {
            let end = rest.rfind(')').ok_or_else(|| unterminated(PYTHON_TAG))?;
            parse_call_list(&rest[..=end])?
        } else if let Some(rest) = after(trimmed, FUNCTOOLS_OPEN) {
            let end = rest.rfind(']').ok_or_else(|| unterminated(FUNCTOOLS_OPEN))?;
            parse_json(&format!("[{}]", &rest[..end]))?
        } else if let Some(rest) = after(trimmed, CALL_START) {
            let end = rest.find(CALL_END).ok_or_else(|| unterminated(CALL_START))?;
            let inner = rest[..end].trim();
            let inner = inner
                .strip_prefix('[')
                .and_then(|i| i.strip_suffix(']'))
                .unwrap_or(inner);
            parse_call_list(inner)?
        } else if trimmed.contains(XML_OPEN) {
            parse_xml_blocks(trimmed)?
        } else if trimmed.starts_with('{') || trimmed.starts_with('[') {
            parse_json(trimmed)?
        } else {
            parse_call_list(trimmed)?
        };

        if calls.is_empty() {
            return Err(ToolError::ToolCall(format!("no tool call found in '{trimmed}'")));
        }
        Ok(calls)
    }

    fn from_object(value: &Value) -> Result<Self, ToolError> {
        let name = value
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::ToolCall("missing \"name\"".to_string()))?;

        let arguments = match value.get("arguments").or_else(|| value.get("parameters")) {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map.clone(),
            Some(other) => {
                return Err(ToolError::ToolCall(format!(
                    "arguments must be an object, got {other}"
                )));
            }
        };

        Ok(Self {
            name: name.to_string(),
            arguments,
        })
    }

    // name(key="value", other='x', bare=3)
    fn from_call_syntax(text: &str) -> Result<Self, ToolError> {
        let open = text
            .find('(')
            .ok_or_else(|| ToolError::ToolCall(format!("expected name(...), got '{text}'")))?;
        let inner = text[open + 1..]
            .strip_suffix(')')
            .ok_or_else(|| unterminated(text))?;

        let name = text[..open].trim();
        let valid = |c: char| c.is_alphanumeric() || c == '_' || c == '.';
        if name.is_empty() || !name.chars().all(valid) {
            return Err(ToolError::ToolCall(format!("invalid tool name '{name}'")));
        }
        // `get_weather.call(...)` style
        let name = name.strip_suffix(".call").unwrap_or(name);

        let mut arguments = Map::new();
        for part in split_top_level(inner)? {
            let (key, raw) = part
                .split_once('=')
                .ok_or_else(|| ToolError::ToolCall(format!("expected key=value, got '{part}'")))?;
            arguments.insert(key.trim().to_string(), parse_value(raw.trim()));
        }

        Ok(Self {
            name: name.to_string(),
            arguments,
        })
    }

    fn string_arg(&self, key: &str) -> Result<&str, ToolError> {
        self.arguments
            .get(key)
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::ToolCall(format!("{} requires a string '{key}'", self.name)))
    }
}

fn after<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    text.find(marker).map(|start| &text[start + marker.len()..])
}

fn unterminated(what: &str) -> ToolError {
    ToolError::ToolCall(format!("unterminated call '{what}'"))
}

/// A JSON call object, or an array of them.
fn parse_json(text: &str) -> Result<Vec<ToolCall>, ToolError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| ToolError::ToolCall(format!("invalid JSON: {e}")))?;

    match &value {
        Value::Array(items) => items.iter().map(ToolCall::from_object).collect(),
        Value::Object(_) => Ok(vec![ToolCall::from_object(&value)?]),
        other => Err(ToolError::ToolCall(format!("expected a call object, got {other}"))),
    }
}

/// Every `<tool_call>...</tool_call>` block, each holding JSON.
fn parse_xml_blocks(text: &str) -> Result<Vec<ToolCall>, ToolError> {
    let mut calls = Vec::new();
    let mut rest = text;

    while let Some(body) = after(rest, XML_OPEN) {
        let end = body.find(XML_CLOSE).ok_or_else(|| unterminated(XML_OPEN))?;
        calls.extend(parse_json(body[..end].trim())?);
        rest = &body[end + XML_CLOSE.len()..];
    }

    Ok(calls)
}

/// `f(), g(a=1)` style lists.
fn parse_call_list(text: &str) -> Result<Vec<ToolCall>, ToolError> {
    split_top_level(text)?
        .into_iter()
        .map(ToolCall::from_call_syntax)
        .collect()
}

/// Splits on commas outside quotes and brackets.
fn split_top_level(text: &str) -> Result<Vec<&str>, ToolError> {
    let mut parts = Vec::new();
    let mut quote: Option<char> = None;
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(' | '[' | '{') => depth += 1,
            (None, ')' | ']' | '}') => {
                depth = depth.checked_sub(1).ok_or_else(|| unbalanced(text))?;
            }
            (None, ',') if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            (None, _) => {}
        }
    }

    if quote.is_some() || depth != 0 {
        return Err(unbalanced(text));
    }
    parts.push(&text[start..]);

    Ok(parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect())
}

fn unbalanced(text: &str) -> ToolError {
    ToolError::ToolCall(format!("unbalanced quotes or brackets in '{text}'"))
}

fn parse_value(raw: &str) -> Value {
    for q in ['"', '\''] {
        if let Some(s) = raw.strip_prefix(q).and_then(|r| r.strip_suffix(q)) {
            return Value::String(s.to_string());
        }
    }
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Runs tool calls against a weather provider and the local clock.
#[derive(Debug)]
pub struct ToolBox {
    weather: Box<dyn WeatherProvider>,
}

impl ToolBox {
    pub fn new(weather: Box<dyn WeatherProvider>) -> Self {
        Self { weather }
    }

    pub async fn invoke(&self, call: &ToolCall) -> Result<Value, ToolError> {
        tracing::debug!(tool = %call.name, "invoking tool");

        match call.name.as_str() {
            GET_CURRENT_TIME => Ok(Value::String(clock::current_time())),
            GET_WEATHER => {
                let city = call.string_arg("city")?;
                let result = self.weather.get_weather(city).await?;
                serde_json::to_value(result)
                    .map_err(|e| ToolError::Data(format!("Failed to encode weather result: {e}")))
            }
            other => Err(ToolError::ToolCall(format!(
                "unknown tool '{other}'. Available tools: {GET_CURRENT_TIME}, {GET_WEATHER}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{WeatherLookup, WeatherResult};
    use async_trait::async_trait;

    #[derive(Debug)]
    struct FixedWeather;

    #[async_trait]
    impl WeatherProvider for FixedWeather {
        async fn get_weather(&self, city: &str) -> Result<WeatherResult, ToolError> {
            if city == "Atlantis" {
                return Err(ToolError::NoMatch(city.to_string()));
            }
            Ok(WeatherResult {
                location: "48.85, 2.35".into(),
                temperature: 12.3,
                temperature_unit: "°C".into(),
                precipitation_probability: 10,
                time: "2024-01-01T00:00".into(),
                timezone: "Europe/Paris".into(),
            })
        }
    }

    fn toolbox() -> ToolBox {
        ToolBox::new(Box::new(FixedWeather))
    }

    fn names(calls: &[ToolCall]) -> Vec<&str> {
        calls.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn weather_schema_requires_city() {
        let tools = builtin_tools();
        let weather = tools.iter().find(|t| t.name == GET_WEATHER).unwrap();
        let schema = weather.to_json();
        let params = &schema["function"]["parameters"];

        assert_eq!(schema["type"], "function");
        assert_eq!(schema["function"]["name"], "get_weather");
        assert_eq!(params["properties"]["city"]["type"], "string");
        assert_eq!(params["required"], json!(["city"]));
    }

    #[test]
    fn time_schema_has_no_parameters() {
        let schema = builtin_tools()[0].to_json();
        assert_eq!(schema["function"]["name"], "get_current_time");
        assert_eq!(schema["function"]["parameters"]["properties"], json!({}));
        assert_eq!(schema["function"]["parameters"]["required"], json!([]));
    }

    #[test]
    fn parses_call_syntax() {
        let call = ToolCall::parse(r#"get_weather(city="New York, NY")"#).unwrap();
        assert_eq!(call.name, "get_weather");
        assert_eq!(call.arguments["city"], "New York, NY");

        let call = ToolCall::parse("get_current_time()").unwrap();
        assert_eq!(call.name, "get_current_time");
        assert!(call.arguments.is_empty());
    }

    #[test]
    fn parses_single_quotes_and_bare_values() {
        let call = ToolCall::parse("get_weather.call(city='Oslo', days=3)").unwrap();
        assert_eq!(call.name, "get_weather");
        assert_eq!(call.arguments["city"], "Oslo");
        assert_eq!(call.arguments["days"], 3);
    }

    #[test]
    fn parses_json_with_arguments_or_parameters() {
        let text = r#"{"name": "get_weather", "arguments": {"city": "Paris"}}"#;
        assert_eq!(ToolCall::parse(text).unwrap().arguments["city"], "Paris");

        let text = r#"{"name": "get_weather", "parameters": {"city": "Lima"}}"#;
        assert_eq!(ToolCall::parse(text).unwrap().arguments["city"], "Lima");

        let call = ToolCall::parse(r#"{"name": "get_current_time"}"#).unwrap();
        assert!(call.arguments.is_empty());
    }

    #[test]
    fn parses_python_tag() {
        let text = r#"Let me check. <|python_tag|>get_weather.call(city="Rome")<|eom_id|>"#;
        let call = ToolCall::parse(text).unwrap();
        assert_eq!(call.name, "get_weather");
        assert_eq!(call.arguments["city"], "Rome");
    }

    #[test]
    fn parses_functools_list() {
        let text = concat!(
            r#"functools[{"name": "get_weather", "arguments": {"city": "Kyiv"}}, "#,
            r#"{"name": "get_current_time", "arguments": {}}]"#,
        );
        let calls = ToolCall::parse_all(text).unwrap();
        assert_eq!(names(&calls), ["get_weather", "get_current_time"]);
        assert_eq!(calls[0].arguments["city"], "Kyiv");
    }

    #[test]
    fn parses_tool_call_tags() {
        let text = concat!(
            r#"<|tool_call_start|>[get_weather(city="Lisbon"), get_current_time()]"#,
            "<|tool_call_end|>",
        );
        let calls = ToolCall::parse_all(text).unwrap();
        assert_eq!(names(&calls), ["get_weather", "get_current_time"]);
        assert_eq!(calls[0].arguments["city"], "Lisbon");
    }

    #[test]
    fn parses_every_xml_block() {
        let text = concat!(
            "<tool_call>\n",
            r#"{"name": "get_weather", "arguments": {"city": "Tokyo"}}"#,
            "\n</tool_call>\n",
            r#"<tool_call>{"name": "get_current_time", "arguments": {}}</tool_call>"#,
        );
        let calls = ToolCall::parse_all(text).unwrap();
        assert_eq!(names(&calls), ["get_weather", "get_current_time"]);
        assert_eq!(calls[0].arguments["city"], "Tokyo");
    }

    #[test]
    fn splits_multiple_plain_calls() {
        let text = r#"get_current_time(), get_weather(city="Paris, France")"#;
        let calls = ToolCall::parse_all(text).unwrap();
        assert_eq!(names(&calls), ["get_current_time", "get_weather"]);
        assert_eq!(calls[1].arguments["city"], "Paris, France");
    }

    #[test]
    fn parse_wants_exactly_one_call() {
        let err = ToolCall::parse("get_current_time(), get_current_time()").unwrap_err();
        assert!(err.to_string().contains("expected one tool call, found 2"));
    }

    #[test]
    fn rejects_malformed_calls() {
        assert!(ToolCall::parse("get_weather").is_err());
        assert!(ToolCall::parse("get_weather(city=\"Paris\"").is_err());
        assert!(ToolCall::parse("get_weather(city=\"Paris)").is_err());
        assert!(ToolCall::parse("get_weather(Paris)").is_err());
        assert!(ToolCall::parse(r#"{"arguments": {}}"#).is_err());
        assert!(ToolCall::parse("(city=1)").is_err());
        assert!(ToolCall::parse("").is_err());
        assert!(ToolCall::parse("<tool_call>{\"name\": \"get_weather\"}").is_err());
        assert!(ToolCall::parse("<|tool_call_start|>[get_current_time()]").is_err());
    }

    #[tokio::test]
    async fn invokes_weather_tool() {
        let call = ToolCall::parse(r#"get_weather(city="Paris")"#).unwrap();
        let value = toolbox().invoke(&call).await.unwrap();

        assert_eq!(value["location"], "48.85, 2.35");
        assert_eq!(value["temperature"], 12.3);
        assert_eq!(value["precipitation_probability"], 10);
        assert_eq!(value["timezone"], "Europe/Paris");
    }

    #[tokio::test]
    async fn invokes_time_tool() {
        let call = ToolCall::parse("get_current_time()").unwrap();
        let value = toolbox().invoke(&call).await.unwrap();
        assert!(value.as_str().is_some_and(|s| s.len() >= 19));
    }

    #[tokio::test]
    async fn weather_tool_requires_city() {
        let call = ToolCall::parse("get_weather()").unwrap();
        let err = toolbox().invoke(&call).await.unwrap_err();
        assert!(matches!(err, ToolError::ToolCall(_)));
        assert!(err.to_string().contains("city"));
    }

    #[tokio::test]
    async fn weather_tool_propagates_provider_errors() {
        let call = ToolCall::parse(r#"get_weather(city="Atlantis")"#).unwrap();
        let err = toolbox().invoke(&call).await.unwrap_err();
        assert!(matches!(err, ToolError::NoMatch(_)));
    }

    #[tokio::test]
    async fn unknown_tool_is_rejected() {
        let call = ToolCall::parse("get_stock_price(ticker=\"ACME\")").unwrap();
        let err = toolbox().invoke(&call).await.unwrap_err();
        assert!(err.to_string().contains("unknown tool 'get_stock_price'"));
    }

    #[tokio::test]
    async fn lookup_classifies_missing_place() {
        assert!(matches!(
            FixedWeather.lookup("Atlantis").await,
            WeatherLookup::NotFound
        ));
        assert!(matches!(
            FixedWeather.lookup("Paris").await,
            WeatherLookup::Found(_)
        ));
    }
}
