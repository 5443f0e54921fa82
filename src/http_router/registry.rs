use super::error::BuildError;
use super::mime::{MIME_ALL, MIME_JSON, MIME_OCTET_STREAM, MIME_TEXT};
use crate::router::BoxError;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// Decodes request bodies of one content type.
pub trait Consumer: Send + Sync {
    fn content_type(&self) -> &str;
    fn consume(&self, body: &[u8]) -> Result<Value, BoxError>;
}

/// Encodes response bodies of one content type.
pub trait Producer: Send + Sync {
    fn content_type(&self) -> &str;
    fn produce(&self, value: &Value, out: &mut Vec<u8>) -> Result<(), BoxError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl Consumer for JsonSerializer {
    fn content_type(&self) -> &str {
        MIME_JSON
    }

    fn consume(&self, body: &[u8]) -> Result<Value, BoxError> {
        Ok(serde_json::from_slice(body)?)
    }
}

impl Producer for JsonSerializer {
    fn content_type(&self) -> &str {
        MIME_JSON
    }

    fn produce(&self, value: &Value, out: &mut Vec<u8>) -> Result<(), BoxError> {
        Ok(serde_json::to_writer(out, value)?)
    }
}

/// `text/plain`: strings pass through, other values are written as JSON
/// text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainSerializer;

impl Consumer for PlainSerializer {
    fn content_type(&self) -> &str {
        MIME_TEXT
    }

    fn consume(&self, body: &[u8]) -> Result<Value, BoxError> {
        let text = std::str::from_utf8(body)?;
        Ok(Value::String(text.to_owned()))
    }
}

impl Producer for PlainSerializer {
    fn content_type(&self) -> &str {
        MIME_TEXT
    }

    fn produce(&self, value: &Value, out: &mut Vec<u8>) -> Result<(), BoxError> {
        match value {
            Value::String(s) => out.extend_from_slice(s.as_bytes()),
            other => out.extend_from_slice(other.to_string().as_bytes()),
        }
        Ok(())
    }
}

/// `application/octet-stream`: handlers read and write raw bytes
/// themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoneSerializer;

impl Consumer for NoneSerializer {
    fn content_type(&self) -> &str {
        MIME_OCTET_STREAM
    }

    fn consume(&self, _body: &[u8]) -> Result<Value, BoxError> {
        Ok(Value::Null)
    }
}

impl Producer for NoneSerializer {
    fn content_type(&self) -> &str {
        MIME_OCTET_STREAM
    }

    fn produce(&self, value: &Value, out: &mut Vec<u8>) -> Result<(), BoxError> {
        match value {
            Value::Null => Ok(()),
            Value::String(s) => {
                out.extend_from_slice(s.as_bytes());
                Ok(())
            }
            _ => Err("octet stream producer only writes strings".into()),
        }
    }
}

/// Consumers and producers by content type.
///
/// The default registry knows JSON, plain text and octet streams.
#[derive(Clone)]
pub struct Registry {
    consumers: HashMap<String, Arc<dyn Consumer>>,
    producers: HashMap<String, Arc<dyn Producer>>,
}

impl Default for Registry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.consumers.insert(MIME_JSON.to_owned(), Arc::new(JsonSerializer));
        registry.consumers.insert(MIME_TEXT.to_owned(), Arc::new(PlainSerializer));
        registry.consumers.insert(MIME_OCTET_STREAM.to_owned(), Arc::new(NoneSerializer));
        registry.producers.insert(MIME_JSON.to_owned(), Arc::new(JsonSerializer));
        registry.producers.insert(MIME_TEXT.to_owned(), Arc::new(PlainSerializer));
        registry.producers.insert(MIME_OCTET_STREAM.to_owned(), Arc::new(NoneSerializer));
        registry
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("consumers", &self.consumers.keys().collect::<Vec<_>>())
            .field("producers", &self.producers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Registry {
    pub fn empty() -> Self {
        Self {
            consumers: HashMap::new(),
            producers: HashMap::new(),
        }
    }

    /// Registers a consumer, replacing the one for the same content type.
    /// A consumer can not claim `*/*`.
    pub fn register_consumer(
        &mut self,
        consumer: impl Consumer + 'static,
    ) -> Result<&mut Self, BuildError> {
        let content_type = consumer.content_type().to_ascii_lowercase();
        if content_type == MIME_ALL {
            return Err(BuildError::InvalidConsumer { content_type });
        }
        self.consumers.insert(content_type, Arc::new(consumer));
        Ok(self)
    }

    /// Registers a producer, replacing the one for the same content type.
    /// A producer can not claim `*/*`.
    pub fn register_producer(
        &mut self,
        producer: impl Producer + 'static,
    ) -> Result<&mut Self, BuildError> {
        let content_type = producer.content_type().to_ascii_lowercase();
        if content_type == MIME_ALL {
            return Err(BuildError::InvalidProducer { content_type });
        }
        self.producers.insert(content_type, Arc::new(producer));
        Ok(self)
    }

    /// Adds the entries of `other` this registry does not have yet.
    pub(super) fn absorb(&mut self, other: Registry) {
        for (content_type, consumer) in other.consumers {
            self.consumers.entry(content_type).or_insert(consumer);
        }
        for (content_type, producer) in other.producers {
            self.producers.entry(content_type).or_insert(producer);
        }
    }

    pub fn consumer(&self, content_type: &str) -> Option<&Arc<dyn Consumer>> {
        self.consumers.get(content_type)
    }

    pub fn producer(&self, content_type: &str) -> Option<&Arc<dyn Producer>> {
        self.producers.get(content_type)
    }
}
