use std::io;

use tracing_subscriber::{
    fmt::{self, MakeWriter},
    layer::Layer,
    registry::LookupSpan,
};

use super::config::{LogFormat, LoggingConfig};

/// Boxed fmt layer writing to stderr.
pub fn build_layer<S>(config: &LoggingConfig) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    build_layer_with_writer(config, io::stderr)
}

/// Boxed fmt layer over any writer. The concrete format type is erased so
/// all three formats share one return type.
pub fn build_layer_with_writer<S, W>(
    config: &LoggingConfig,
    writer: W,
) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(config.with_ansi)
        .with_target(config.with_target)
        .with_line_number(config.with_line_numbers);

    match config.format {
        LogFormat::Json => Box::new(layer.json().with_current_span(true)),
        LogFormat::Pretty => Box::new(layer.pretty()),
        LogFormat::Compact => Box::new(layer.compact()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tracing_subscriber::{prelude::*, registry::Registry};

    use super::*;

    // Буферный writer для тестов
    #[derive(Clone)]
    struct VecMakeWriter(Arc<Mutex<Vec<u8>>>);

    impl<'a> MakeWriter<'a> for VecMakeWriter {
        type Writer = VecWriterGuard;

        fn make_writer(&'a self) -> Self::Writer {
            VecWriterGuard(self.0.clone())
        }
    }

    struct VecWriterGuard(Arc<Mutex<Vec<u8>>>);

    impl io::Write for VecWriterGuard {
        fn write(
            &mut self,
            buf: &[u8],
        ) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture(config: &LoggingConfig) -> String {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let layer = build_layer_with_writer::<Registry, _>(config, VecMakeWriter(buffer.clone()));
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(keys = 3, "marshal finished");
        });
        let out = buffer.lock().unwrap();
        String::from_utf8_lossy(&out).into_owned()
    }

    #[test]
    fn test_json_format() {
        let cfg = LoggingConfig {
            format: LogFormat::Json,
            with_ansi: false,
            ..Default::default()
        };
        let out = capture(&cfg);
        let line: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(line["fields"]["message"], "marshal finished");
        assert_eq!(line["fields"]["keys"], 3);
    }

    #[test]
    fn test_compact_format() {
        let cfg = LoggingConfig {
            with_ansi: false,
            ..Default::default()
        };
        let out = capture(&cfg);
        assert!(out.contains("marshal finished"));
        assert!(out.contains("keys=3"));
    }
}
