use std::io;

use bitbundle::{
    init_logging, marshal, unmarshal, Bundle, Date, LogFormat, LoggingConfig, Value,
};

fn main() -> io::Result<()> {
    let logging = LoggingConfig {
        level: "bitbundle=debug,info".to_string(),
        format: LogFormat::Compact,
        ..Default::default()
    };
    if let Err(e) = init_logging(logging) {
        eprintln!("logging disabled: {e}");
    }

    println!("=== Bundle round trip ===\n");

    let bundle = sample_bundle();
    println!("Input:   {bundle}");

    let bytes = marshal(&bundle)?;
    println!("Encoded: {} bytes", bytes.len());
    print_hex(&bytes);

    let decoded = unmarshal(&bytes)?;
    println!("\nDecoded: {decoded}");
    println!("Equal:   {}", decoded == bundle);

    // Словарь не переживает вызов: "user" снова передаётся целиком.
    let again = marshal(&Bundle::new().with("user", "second"))?;
    println!("\nIndependent call re-sends key names: {} bytes", again.len());

    Ok(())
}

fn sample_bundle() -> Bundle {
    let profile = Bundle::new()
        .with("name", "Ada")
        .with("age", 36i32)
        .with("created", Date::from_millis(1_700_000_000_000));

    let mut b = Bundle::new();
    b.put_int("a", 1);
    b.put_string("b", "hello".to_string());
    b.put_int_array("c", [Some(1), Some(2), Some(3)]);
    b.put_double_list("scores", [Some(9.5), None, Some(7.25)]);
    b.put_bytes("blob", vec![0xDEu8, 0xAD, 0xBE, 0xEF]);
    b.put("user", profile.clone());
    b.put(
        "friends",
        Value::list([profile.clone().with("name", "Grace"), profile.with("name", "Linus")]),
    );
    b
}

fn print_hex(bytes: &[u8]) {
    for (row, chunk) in bytes.chunks(16).enumerate() {
        let hex: Vec<String> = chunk.iter().map(|b| format!("{b:02x}")).collect();
        let ascii: String = chunk
            .iter()
            .map(|&b| {
                if b.is_ascii_graphic() {
                    b as char
                } else {
                    '.'
                }
            })
            .collect();
        println!("  {:04x}  {:<47}  {}", row * 16, hex.join(" "), ascii);
    }
}
