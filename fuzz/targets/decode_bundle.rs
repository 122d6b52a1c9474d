#![no_main]
use bitbundle::{marshal, unmarshal};
use libfuzzer_sys::fuzz_target;

// Произвольные байты: декодер либо возвращает ошибку, либо Bundle, который
// кодируется и декодируется обратно в равный.
fuzz_target!(|data: &[u8]| {
    if let Ok(bundle) = unmarshal(data) {
        let bytes = marshal(&bundle).expect("decoded bundle must re-encode");
        let again = unmarshal(&bytes).expect("re-encoded bundle must decode");
        assert_eq!(again, bundle);
    }
});
