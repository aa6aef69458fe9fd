use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Точечная аннотация: обычно `{x, y, text}`, хранится как прислал клиент
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Annotation(Map<String, Value>);

impl Annotation {
    pub fn new(x: f64, y: f64, text: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("x".to_string(), Value::from(x));
        fields.insert("y".to_string(), Value::from(y));
        fields.insert("text".to_string(), Value::from(text.into()));
        Self(fields)
    }

    /// Принимает только непустой JSON-объект
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) if !fields.is_empty() => Some(Self(fields)),
            _ => None,
        }
    }

    pub fn x(&self) -> Option<f64> {
        self.0.get("x").and_then(Value::as_f64)
    }

    pub fn y(&self) -> Option<f64> {
        self.0.get("y").and_then(Value::as_f64)
    }

    pub fn text(&self) -> Option<&str> {
        self.0.get("text").and_then(Value::as_str)
    }
}

/// Ответ на успешное добавление аннотации
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppendResponse {
    pub success: bool,
}

/// Вопрос к модели по фрагменту изображения
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: Option<String>,
    /// Base64, возможно с заголовком `data:<mime>;base64,`
    #[serde(default, rename = "image_base_64", alias = "image")]
    pub image: Option<String>,
}

/// Ответ модели, непрозрачный текст
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
}

/// Тело ошибки для всех JSON-эндпоинтов
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
