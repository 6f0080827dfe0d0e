//! # Wire Format
//!
//! Literal byte vectors for every shape the encoder produces, and the exact
//! error each malformed header or truncated buffer reports on decode.
//!
//! These bytes are the interface between independent implementations. If a
//! vector here changes, the format changed.

use datamap::{
    CodecError, Constructed, Data, DataArray, MappedComposite, OwnedRecord, ParentContext,
    Primitive, Record, RecordList, Value,
};

fn kind(report: &eyre::Report) -> &CodecError {
    report
        .downcast_ref::<CodecError>()
        .unwrap_or_else(|| panic!("not a codec error: {report:?}"))
}

fn encode(value: impl Into<Constructed>) -> Vec<u8> {
    let mut value = value.into();
    value.encode(false).unwrap().0.to_vec()
}

mod encode_vectors {
    use super::*;

    #[test]
    fn nil_primitive() {
        assert_eq!(encode(Primitive::nil()), [0x00]);
    }

    #[test]
    fn empty_primitive_matches_nil() {
        assert_eq!(encode(Primitive::new("")), [0x00]);
    }

    #[test]
    fn short_primitive() {
        assert_eq!(encode("a"), [0x01, 0x01, 0x61]);
        assert_eq!(encode("abc"), [0x01, 0x03, 0x61, 0x62, 0x63]);
    }

    #[test]
    fn long_primitive_uses_big_endian_length() {
        let buf = encode(vec![0x5A; 0x0123]);
        assert_eq!(&buf[..3], &[0x02, 0x01, 0x23]);
        assert_eq!(buf.len(), 3 + 0x0123);
    }

    #[test]
    fn array_of_one_primitive() {
        let mut array = DataArray::new();
        array.append("abc");
        assert_eq!(encode(array), [0x41, 0x01, 0x05, 0x01, 0x03, 0x61, 0x62, 0x63]);
    }

    #[test]
    fn record_with_key_only() {
        let mut record = OwnedRecord::new("abc");
        assert_eq!(record.encode().unwrap(), &[0x40, 0x03, 0x61, 0x62, 0x63]);
    }

    #[test]
    fn record_with_all_fields() {
        let mut record = OwnedRecord::new("ab").with_value("cd").with_scheme("ef");
        assert_eq!(
            record.encode().unwrap(),
            &[0x54, 0x02, 0x61, 0x62, 0x02, 0x63, 0x64, 0x02, 0x65, 0x66]
        );
    }

    #[test]
    fn record_list_of_one_record() {
        let mut list = RecordList::new();
        list.append(OwnedRecord::new("abc"));
        assert_eq!(encode(list), [0x11, 0x01, 0x05, 0x40, 0x03, 0x61, 0x62, 0x63]);
    }

    #[test]
    fn record_with_composite_value() {
        let mut inner = DataArray::new();
        inner.append("x");
        let mut record = OwnedRecord::new("k").with_value(inner);
        assert_eq!(
            record.encode().unwrap(),
            &[0x70, 0x01, b'k', 0x41, 0x01, 0x03, 0x01, 0x01, b'x']
        );
    }
}

mod length_boundaries {
    use super::*;

    #[test]
    fn length_codes_select_by_content_size() {
        let cases = [(0usize, 0x00u8), (1, 0x01), (255, 0x01), (256, 0x02), (65535, 0x02)];
        for (len, header) in cases {
            let buf = encode(vec![7u8; len]);
            assert_eq!(buf[0], header, "length {len}");

            let view = MappedComposite::new(&buf).unwrap();
            assert_eq!(view.raw_bytes().unwrap().len(), len);
        }
    }

    #[test]
    fn length_65536_is_content_too_large() {
        let mut value = Constructed::from(vec![0u8; 65536]);
        let err = value.encode(false).unwrap_err();
        assert_eq!(kind(&err), &CodecError::ContentTooLarge { len: 65536, max: 65535 });

        let err = value.encode(true).unwrap_err();
        assert_eq!(kind(&err), &CodecError::ContentTooLarge { len: 65536, max: 65535 });
    }

    #[test]
    fn child_context_echoes_length_code() {
        let mut short = Primitive::new(vec![1u8; 255]);
        assert_eq!(short.encode(true).unwrap().1, ParentContext::OneByteLength);

        let mut long = Primitive::new(vec![1u8; 256]);
        assert_eq!(long.encode(true).unwrap().1, ParentContext::TwoByteLength);
    }
}

mod nesting_limit {
    use super::*;
    use datamap::config::MAX_NESTING_DEPTH;
    use datamap::MappedRecord;

    /// `levels` one-child arrays around the leaf `01 01 78`, framed by hand.
    fn nested_bytes(levels: usize) -> Vec<u8> {
        let mut buf = vec![0x01, 0x01, b'x'];
        for _ in 0..levels {
            let len = buf.len();
            let mut frame = if len <= 0xFF {
                vec![0x41, 0x01, len as u8]
            } else {
                vec![0x42, 0x01, (len >> 8) as u8, len as u8]
            };
            frame.append(&mut buf);
            buf = frame;
        }
        buf
    }

    fn nested_owned(levels: usize) -> Constructed {
        let mut value = Constructed::from("x");
        for _ in 0..levels {
            value = DataArray::with_children(vec![value]).into();
        }
        value
    }

    fn too_deep(depth: usize) -> CodecError {
        CodecError::NestingTooDeep {
            depth,
            max: MAX_NESTING_DEPTH,
        }
    }

    #[test]
    fn hand_framed_nesting_matches_encoder() {
        assert_eq!(encode(nested_owned(3)), nested_bytes(3));
    }

    #[test]
    fn nesting_at_limit_lifts_and_reencodes() {
        let buf = nested_bytes(MAX_NESTING_DEPTH);
        let lifted = MappedComposite::new(&buf).unwrap().copy_construct().unwrap();
        assert_eq!(lifted, nested_owned(MAX_NESTING_DEPTH));
        assert_eq!(encode(lifted), buf);
    }

    #[test]
    fn nesting_past_limit_fails_on_lift() {
        let buf = nested_bytes(MAX_NESTING_DEPTH + 1);
        let view = MappedComposite::new(&buf).unwrap();
        let err = view.copy_construct().unwrap_err();
        assert_eq!(kind(&err), &too_deep(MAX_NESTING_DEPTH + 1));
    }

    #[test]
    fn thousands_of_levels_fail_without_overflowing() {
        let buf = nested_bytes(2000);
        let view = MappedComposite::new(&buf).unwrap();
        let err = view.copy_construct().unwrap_err();
        assert_eq!(kind(&err), &too_deep(MAX_NESTING_DEPTH + 1));

        let mut node = &view;
        for _ in 0..MAX_NESTING_DEPTH {
            node = node.child_at(0).unwrap();
        }
        assert!(node.child_at(0).is_err());
    }

    #[test]
    fn record_fields_count_as_a_level() {
        let mut buf = vec![0xC0];
        buf.extend(nested_bytes(MAX_NESTING_DEPTH));
        let (record, _) = MappedRecord::decode(&buf).unwrap();
        let err = record.copy_construct().unwrap_err();
        assert_eq!(kind(&err), &too_deep(MAX_NESTING_DEPTH + 1));

        let mut record = OwnedRecord::new(nested_owned(MAX_NESTING_DEPTH));
        let err = record.encode().unwrap_err();
        assert_eq!(kind(&err), &too_deep(MAX_NESTING_DEPTH + 1));

        let mut record = OwnedRecord::new(nested_owned(MAX_NESTING_DEPTH - 1));
        assert!(record.encode().is_ok());
    }

    #[test]
    fn encode_rejects_what_decode_would() {
        let mut value = nested_owned(MAX_NESTING_DEPTH + 1);
        let err = value.encode(false).unwrap_err();
        assert_eq!(kind(&err), &too_deep(MAX_NESTING_DEPTH + 1));
        assert!(!value.is_encoded());

        let mut list = RecordList::new();
        list.append(OwnedRecord::new(nested_owned(MAX_NESTING_DEPTH)));
        let err = Constructed::from(list).encode(false).unwrap_err();
        assert_eq!(kind(&err), &too_deep(MAX_NESTING_DEPTH + 1));
    }

    #[test]
    fn nesting_error_names_the_depth() {
        assert_eq!(
            too_deep(129).to_string(),
            format!("nesting depth 129 exceeds maximum {MAX_NESTING_DEPTH}")
        );
    }
}

mod decode_errors {
    use super::*;

    #[test]
    fn reserved_codes_are_invalid_header() {
        for byte in [0xC0u8, 0x30, 0x03] {
            let err = MappedComposite::new(&[byte, 0, 0, 0][..]).unwrap_err();
            assert!(
                matches!(kind(&err), CodecError::InvalidHeader { .. }),
                "header {byte:#04x}"
            );
        }
    }

    #[test]
    fn both_count_codes_conflict() {
        let err = MappedComposite::new(&[0x55, 0x01, 0x01, 0x01, 0x00][..]).unwrap_err();
        assert_eq!(kind(&err), &CodecError::ConflictingVariant { byte: 0x55 });
    }

    #[test]
    fn lookup_and_compression_are_unsupported() {
        let err = MappedComposite::new(&[0x08][..]).unwrap_err();
        assert!(matches!(kind(&err), CodecError::UnsupportedFeature { feature: "lookup", .. }));

        let err = MappedComposite::new(&[0x04][..]).unwrap_err();
        assert!(matches!(
            kind(&err),
            CodecError::UnsupportedFeature { feature: "compression", .. }
        ));
    }

    #[test]
    fn truncated_mid_length_prefix() {
        // Array header, one-byte count present, two-byte length cut off.
        let err = MappedComposite::new(&[0x42, 0x01, 0x00][..]).unwrap_err();
        assert_eq!(kind(&err), &CodecError::TruncatedBuffer { needed: 4, available: 3 });
    }

    #[test]
    fn truncated_content() {
        let full = encode("hello");
        let err = MappedComposite::new(&full[..4]).unwrap_err();
        assert_eq!(kind(&err), &CodecError::TruncatedBuffer { needed: 7, available: 4 });
    }

    #[test]
    fn error_in_nested_child_keeps_kind_and_context() {
        // Outer array announces one child whose header reserves code 3.
        let buf = [0x41, 0x01, 0x02, 0x03, 0x00];
        let view = MappedComposite::new(&buf[..]).unwrap();
        let err = view.child_at(0).unwrap_err();
        assert!(matches!(kind(&err), CodecError::InvalidHeader { field: "content length", .. }));
        assert!(err.to_string().contains("child 0"));
    }

    #[test]
    fn value_decode_from_reports_same_errors() {
        let err = Value::decode_from(&[0x51, 0x00][..]).unwrap_err();
        assert_eq!(kind(&err), &CodecError::ConflictingVariant { byte: 0x51 });
    }

    #[test]
    fn errors_display_the_offending_byte() {
        let err = MappedComposite::new(&[0x0B][..]).unwrap_err();
        assert_eq!(err.to_string(), "invalid header 0x0b: lookup not supported");
    }
}
