use ethereum_types::H256;
use ssz::{Decode, DecodeError, Encode};
use ssz_derive::{Decode, Encode};

mod round_trip {
    use super::*;

    fn round_trip<T: Encode + Decode + std::fmt::Debug + PartialEq>(items: Vec<T>) {
        for item in items {
            let encoded = &item.as_ssz_bytes();
            assert_eq!(item.ssz_bytes_len(), encoded.len());
            assert_eq!(T::from_ssz_bytes(encoded), Ok(item));
        }
    }

    #[test]
    fn bool() {
        let items: Vec<bool> = vec![true, false];

        round_trip(items);
    }

    #[test]
    fn u8_array_4() {
        let items: Vec<[u8; 4]> = vec![[0, 0, 0, 0], [1, 0, 0, 0], [1, 2, 3, 4], [1, 2, 0, 4]];

        round_trip(items);
    }

    #[test]
    fn h256() {
        let items: Vec<H256> = vec![H256::zero(), H256::from([1; 32]), H256::random()];

        round_trip(items);
    }

    #[test]
    fn vec_of_h256() {
        let items: Vec<Vec<H256>> = vec![
            vec![],
            vec![H256::zero(), H256::from([1; 32]), H256::random()],
        ];

        round_trip(items);
    }

    #[test]
    fn vec_u16() {
        let items: Vec<Vec<u16>> = vec![
            vec![],
            vec![255],
            vec![0, 1, 2],
            vec![100; 64],
            vec![255, 0, 255],
        ];

        round_trip(items);
    }

    #[test]
    fn vec_of_vec_u16() {
        let items: Vec<Vec<Vec<u16>>> = vec![
            vec![],
            vec![vec![]],
            vec![vec![1, 2, 3]],
            vec![vec![], vec![]],
            vec![vec![], vec![1, 2, 3]],
            vec![vec![1, 2, 3], vec![1, 2, 3]],
            vec![vec![1, 2, 3], vec![], vec![1, 2, 3]],
            vec![vec![], vec![], vec![1, 2, 3]],
            vec![vec![], vec![1], vec![1, 2, 3]],
            vec![vec![], vec![1], vec![1, 2, 3]],
        ];

        round_trip(items);
    }

    #[test]
    fn smallvec_u16() {
        use smallvec::{smallvec, SmallVec};

        let items: Vec<SmallVec<[u16; 4]>> = vec![
            smallvec![],
            smallvec![255],
            smallvec![0, 1, 2, 3, 4, 5],
        ];

        round_trip(items);
    }

    #[derive(Debug, PartialEq, Encode, Decode)]
    struct FixedLen {
        a: u16,
        b: u64,
        c: u32,
    }

    #[test]
    #[allow(clippy::zero_prefixed_literal)]
    fn fixed_len_struct_encoding() {
        let items: Vec<FixedLen> = vec![
            FixedLen { a: 0, b: 0, c: 0 },
            FixedLen { a: 1, b: 1, c: 1 },
            FixedLen { a: 1, b: 0, c: 1 },
        ];

        let expected_encodings = vec![
            //  | u16--| u64----------------------------| u32----------|
            vec![00, 00, 00, 00, 00, 00, 00, 00, 00, 00, 00, 00, 00, 00],
            vec![01, 00, 01, 00, 00, 00, 00, 00, 00, 00, 01, 00, 00, 00],
            vec![01, 00, 00, 00, 00, 00, 00, 00, 00, 00, 01, 00, 00, 00],
        ];

        for i in 0..items.len() {
            assert_eq!(
                items[i].as_ssz_bytes(),
                expected_encodings[i],
                "Failed on {}",
                i
            );
        }
    }

    #[test]
    fn fixed_len_excess_bytes() {
        let fixed = FixedLen { a: 1, b: 2, c: 3 };

        let mut bytes = fixed.as_ssz_bytes();
        bytes.append(&mut vec![0]);

        assert_eq!(
            FixedLen::from_ssz_bytes(&bytes),
            Err(DecodeError::InvalidByteLength {
                len: 15,
                expected: 14,
            })
        );
    }

    #[test]
    fn vec_of_fixed_len_struct() {
        let items: Vec<FixedLen> = vec![
            FixedLen { a: 0, b: 0, c: 0 },
            FixedLen { a: 1, b: 1, c: 1 },
            FixedLen { a: 1, b: 0, c: 1 },
        ];

        round_trip(items);
    }

    #[derive(Debug, PartialEq, Encode, Decode)]
    struct VariableLen {
        a: u16,
        b: Vec<u16>,
        c: u32,
    }

    #[test]
    #[allow(clippy::zero_prefixed_literal)]
    fn offset_into_fixed_bytes() {
        let bytes = vec![
            //  1   2   3   4   5   6   7   8   9   10  11  12  13  14  15
            //      | offset        | u32           | variable
            01, 00, 09, 00, 00, 00, 01, 00, 00, 00, 00, 00, 01, 00, 02, 00,
        ];

        assert_eq!(
            VariableLen::from_ssz_bytes(&bytes),
            Err(DecodeError::OffsetIntoFixedPortion(9))
        );
    }

    #[test]
    fn variable_len_excess_bytes() {
        let variable = VariableLen {
            a: 1,
            b: vec![2],
            c: 3,
        };

        let mut bytes = variable.as_ssz_bytes();
        bytes.append(&mut vec![0]);

        // The error message triggered is not so helpful, it's caught by a side-effect. Just
        // checking there is _some_ error is fine.
        assert!(VariableLen::from_ssz_bytes(&bytes).is_err());
    }

    #[test]
    #[allow(clippy::zero_prefixed_literal)]
    fn first_offset_skips_byte() {
        let bytes = vec![
            //  1   2   3   4   5   6   7   8   9   10  11  12  13  14  15
            //      | offset        | u32           | variable
            01, 00, 11, 00, 00, 00, 01, 00, 00, 00, 00, 00, 01, 00, 02, 00,
        ];

        assert_eq!(
            VariableLen::from_ssz_bytes(&bytes),
            Err(DecodeError::OffsetSkipsVariableBytes(11))
        );
    }

    #[test]
    #[allow(clippy::zero_prefixed_literal)]
    fn variable_len_struct_encoding() {
        let items: Vec<VariableLen> = vec![
            VariableLen {
                a: 0,
                b: vec![],
                c: 0,
            },
            VariableLen {
                a: 1,
                b: vec![0],
                c: 1,
            },
            VariableLen {
                a: 1,
                b: vec![0, 1, 2],
                c: 1,
            },
        ];

        let expected_encodings = vec![
            //   00..................................09
            //  | u16--| vec offset-----| u32------------| vec payload --------|
            vec![00, 00, 10, 00, 00, 00, 00, 00, 00, 00],
            vec![01, 00, 10, 00, 00, 00, 01, 00, 00, 00, 00, 00],
            vec![
                01, 00, 10, 00, 00, 00, 01, 00, 00, 00, 00, 00, 01, 00, 02, 00,
            ],
        ];

        for i in 0..items.len() {
            assert_eq!(
                items[i].as_ssz_bytes(),
                expected_encodings[i],
                "Failed on {}",
                i
            );
        }
    }

    #[test]
    fn vec_of_variable_len_struct() {
        let items: Vec<VariableLen> = vec![
            VariableLen {
                a: 0,
                b: vec![],
                c: 0,
            },
            VariableLen {
                a: 255,
                b: vec![0, 1, 2, 3],
                c: 99,
            },
            VariableLen {
                a: 255,
                b: vec![0],
                c: 99,
            },
            VariableLen {
                a: 50,
                b: vec![0],
                c: 0,
            },
        ];

        round_trip(items);
    }

    #[derive(Debug, PartialEq, Encode, Decode)]
    struct ThreeVariableLen {
        a: u16,
        b: Vec<u16>,
        c: Vec<u16>,
        d: Vec<u16>,
    }

    #[test]
    fn three_variable_len() {
        let vec: Vec<ThreeVariableLen> = vec![ThreeVariableLen {
            a: 42,
            b: vec![0],
            c: vec![1],
            d: vec![2],
        }];

        round_trip(vec);
    }

    #[test]
    #[allow(clippy::zero_prefixed_literal)]
    fn offsets_decreasing() {
        let bytes = vec![
            //  1   2   3   4   5   6   7   8   9   10  11  12  13  14  15
            //      | offset        | offset        | offset        | variable
            01, 00, 14, 00, 00, 00, 15, 00, 00, 00, 14, 00, 00, 00, 00, 00,
        ];

        assert_eq!(
            ThreeVariableLen::from_ssz_bytes(&bytes),
            Err(DecodeError::OffsetsAreDecreasing(14))
        );
    }
}

mod zero_value_policy {
    use super::*;

    #[derive(Debug, PartialEq, Default, Encode, Decode)]
    struct Empty {}

    #[derive(Debug, PartialEq, Default, Encode, Decode)]
    struct Body {
        epoch: u64,
    }

    #[derive(Debug, PartialEq, Encode, Decode)]
    struct Example {
        slot: u64,
        root: [u8; 32],
        body: Option<Body>,
    }

    #[test]
    fn nil_element_encodes_to_empty_bytes() {
        let item: Option<Empty> = None;
        assert_eq!(ssz::ssz_encode(&item), Vec::<u8>::new());
    }

    #[test]
    fn null_sub_value_equals_zero_sub_value() {
        let root = {
            let mut root = [0; 32];
            root[..4].copy_from_slice(&[1, 2, 3, 4]);
            root
        };

        let item = Example {
            slot: 5,
            root,
            body: None,
        };
        let item2 = Example {
            slot: 5,
            root,
            body: Some(Body::default()),
        };

        let enc = ssz::ssz_encode(&item);
        let enc2 = ssz::ssz_encode(&item2);
        assert_eq!(enc, enc2);

        // The decoded destination holds an instantiated (zeroed) sub-value.
        let dec = Example::from_ssz_bytes(&enc).unwrap();
        assert_eq!(dec, item2);
    }

    #[derive(Debug, PartialEq, Encode, Decode)]
    struct WithList {
        slot: u64,
        graffiti: Option<Vec<u8>>,
        deposit_index: u64,
    }

    #[test]
    fn absent_list_equals_empty_list() {
        let b1 = WithList {
            slot: 5,
            graffiti: None,
            deposit_index: 64,
        };
        let b2 = WithList {
            slot: 5,
            graffiti: Some(vec![]),
            deposit_index: 64,
        };

        assert_eq!(ssz::ssz_encode(&b1), ssz::ssz_encode(&b2));
    }

    #[derive(Debug, PartialEq, Default, Encode, Decode)]
    struct Transfer {
        amount: u64,
        data: Vec<u8>,
    }

    #[derive(Debug, PartialEq, Encode, Decode)]
    struct Block {
        slot: u64,
        transfers: Vec<Transfer>,
    }

    #[test]
    fn partial_data_round_trip() {
        let block = Block {
            slot: 5,
            transfers: vec![],
        };

        let enc = ssz::ssz_encode(&block);
        assert_eq!(Block::from_ssz_bytes(&enc), Ok(block));
    }
}

mod facade {
    use super::*;

    #[derive(Debug, PartialEq, Encode, Decode)]
    struct Single {
        foo: u32,
    }

    #[test]
    fn single_u32_field_encoding() {
        assert_eq!(
            ssz::ssz_encode(&Single { foo: 12345 }),
            vec![0x39, 0x30, 0x00, 0x00]
        );
    }

    #[test]
    fn encoded_length_matches_precomputed_size() {
        let item = Single { foo: 99 };
        assert_eq!(ssz::ssz_encode(&item).len(), item.ssz_bytes_len());
    }

    #[test]
    fn decode_rejects_empty_input() {
        assert_eq!(
            ssz::ssz_decode::<Single>(&[]),
            Err(DecodeError::EmptyBytes)
        );
    }

    #[test]
    fn decode_wraps_errors_with_type_name() {
        match ssz::ssz_decode::<Single>(&[0; 5]) {
            Err(DecodeError::Context(ty, inner)) => {
                assert!(ty.contains("Single"));
                assert_eq!(
                    *inner,
                    DecodeError::InvalidByteLength {
                        len: 5,
                        expected: 4
                    }
                );
            }
            other => panic!("expected a context-wrapped error, got {:?}", other),
        }
    }

    #[test]
    fn decode_round_trip() {
        let item = Single { foo: 12345 };
        assert_eq!(ssz::ssz_decode::<Single>(&ssz::ssz_encode(&item)), Ok(item));
    }

    #[test]
    fn boolean_vector_16() {
        let bytes = [0x01; 16];
        assert_eq!(
            ssz::ssz_decode::<[bool; 16]>(&bytes),
            Ok([true; 16])
        );

        // One byte missing.
        assert!(ssz::ssz_decode::<[bool; 16]>(&bytes[..15]).is_err());

        // One byte extra.
        let mut long = bytes.to_vec();
        long.push(0xff);
        assert!(ssz::ssz_decode::<[bool; 16]>(&long).is_err());
    }
}
