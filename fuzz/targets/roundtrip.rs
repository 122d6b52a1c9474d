#![no_main]
use arbitrary::{Result, Unstructured};
use bitbundle::{marshal, unmarshal, Bundle, Date, Value};
use libfuzzer_sys::fuzz_target;

/// Скаляр вида `kind`; для Bundle рекурсия ограничена `depth`.
fn arb_scalar(
    u: &mut Unstructured<'_>,
    kind: u8,
    depth: usize,
) -> Result<Value> {
    Ok(match kind {
        0 => Value::String(u.arbitrary()?),
        1 => Value::Int(u.arbitrary()?),
        2 => Value::Long(u.arbitrary()?),
        3 => Value::Boolean(u.arbitrary()?),
        4 => Value::Double(u.arbitrary()?),
        5 if depth > 0 => Value::Bundle(arb_bundle(u, depth - 1)?),
        6 => Value::Date(Date::from_millis(u.arbitrary()?)),
        7 => Value::Float(u.arbitrary()?),
        8 => Value::Short(u.arbitrary()?),
        9 => Value::Byte(u.arbitrary()?),
        _ => Value::Char(u.arbitrary()?),
    })
}

fn arb_value(
    u: &mut Unstructured<'_>,
    depth: usize,
) -> Result<Value> {
    let kind = u.int_in_range::<u8>(0..=10)?;
    match u.int_in_range::<u8>(0..=3)? {
        0 => {
            let bytes: Vec<u8> = u.arbitrary()?;
            Ok(Value::Bytes(bytes))
        }
        shape @ (1 | 2) => {
            let len = u.int_in_range::<usize>(0..=8)?;
            let mut items = Vec::with_capacity(len);
            for _ in 0..len {
                items.push(if u.arbitrary::<bool>()? {
                    Some(arb_scalar(u, kind, depth)?)
                } else {
                    None
                });
            }
            // byte-массив с null-флагами невыразим
            if shape == 1 || kind == 9 {
                Ok(Value::List(items))
            } else {
                Ok(Value::Array(items))
            }
        }
        _ => arb_scalar(u, kind, depth),
    }
}

fn arb_bundle(
    u: &mut Unstructured<'_>,
    depth: usize,
) -> Result<Bundle> {
    let n = u.int_in_range::<usize>(0..=6)?;
    let mut b = Bundle::new();
    for _ in 0..n {
        let key: String = u.arbitrary()?;
        b.put(key, arb_value(u, depth)?);
    }
    Ok(b)
}

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let Ok(bundle) = arb_bundle(&mut u, 3) else {
        return;
    };
    let bytes = marshal(&bundle).expect("generated bundle must encode");
    let decoded = unmarshal(&bytes).expect("encoded bundle must decode");
    assert_eq!(decoded, bundle);
    assert_eq!(marshal(&decoded).expect("re-encode"), bytes);
});
