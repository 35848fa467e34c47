use proptest::prelude::*;
use remap_api::{Container, Kind, Record, Sequence, Value};
use remap_engine::{ContainerSpec, Mapper, convert};

#[derive(Record, Default, Debug, Clone, PartialEq)]
struct Row {
    #[remap(remapper = "0")]
    int_val: i64,
    #[remap(remapper = "1")]
    uint_val: u64,
    #[remap(remapper = "2")]
    str_val: String,
    #[remap(remapper = "3")]
    float_val: f64,
    #[remap(remapper = "4")]
    bool_val: bool,
}

fn row_strategy() -> impl Strategy<Value = Row> {
    (
        any::<i64>(),
        any::<u64>(),
        "[a-zA-Z0-9]([a-zA-Z0-9 ]{0,16}[a-zA-Z0-9])?",
        -1_000_000_000i64..1_000_000_000,
        any::<bool>(),
    )
        .prop_map(|(int_val, uint_val, str_val, ten_thousandths, bool_val)| Row {
            int_val,
            uint_val,
            str_val,
            float_val: ten_thousandths as f64 / 10_000.0,
            bool_val,
        })
}

fn kind_strategy() -> impl Strategy<Value = Kind> {
    prop::sample::select(vec![
        Kind::Any,
        Kind::Bool,
        Kind::I8,
        Kind::I16,
        Kind::I32,
        Kind::I64,
        Kind::Isize,
        Kind::U8,
        Kind::U16,
        Kind::U32,
        Kind::U64,
        Kind::Usize,
        Kind::F32,
        Kind::F64,
        Kind::String,
    ])
}

fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        any::<u64>().prop_map(Value::UInt),
        (-1.0e9f64..1.0e9).prop_map(Value::Float),
        "[a-z ]{0,8}".prop_map(Value::Str),
    ]
}

fn mapper() -> Mapper {
    Mapper::new(
        ContainerSpec::record::<Row>(),
        ContainerSpec::sequence(Kind::String).len(5),
        None,
    )
    .unwrap()
}

proptest! {
    #[test]
    fn record_round_trips_through_strings(row in row_strategy()) {
        let mapper = mapper();
        let strings = mapper.map(&Container::record(row.clone())).unwrap().unwrap();
        let back = mapper.map_record::<Row>(&strings).unwrap();
        prop_assert_eq!(back, Some(row));
    }

    #[test]
    fn blank_strings_are_absent(blank in "[ \t]{0,6}", target in kind_strategy()) {
        prop_assert_eq!(convert(&Value::Str(blank), target).unwrap(), None);
    }

    #[test]
    fn set_then_get_returns_value(value in value_strategy(), position in 0usize..5) {
        let mapper = Mapper::new(
            ContainerSpec::record::<Row>(),
            ContainerSpec::sequence(Kind::Any).len(5),
            None,
        )
        .unwrap();
        let name = position.to_string();
        let mut row = Container::from(Sequence::with_len(Kind::Any, 5));
        mapper.set_by_name(&mut row, &name, value.clone()).unwrap();
        prop_assert_eq!(mapper.get_by_name(&row, &name).unwrap(), value);
    }

    #[test]
    fn blank_row_maps_to_nothing(blanks in prop::collection::vec("[ ]{0,3}", 5)) {
        let row = Container::from(Sequence::strings(blanks));
        prop_assert!(mapper().map(&row).unwrap().is_none());
    }
}
