use super::models::{self, Drawing, Shape};
use proptest::prelude::*;

fn arb_shape() -> impl Strategy<Value = Shape> {
    prop_oneof![
        (-1e12f64..1e12).prop_map(|radius| Shape::Circle { radius }),
        (-1e12f64..1e12, -1e12f64..1e12).prop_map(|(w, h)| Shape::Rect { w, h }),
        (any::<String>(), any::<u16>(), any::<bool>())
            .prop_map(|(body, size, bold)| Shape::Text { body, size, bold }),
        Just(Shape::Empty),
    ]
}

fn arb_drawing() -> impl Strategy<Value = Drawing> {
    prop_oneof![
        arb_shape().prop_map(|shape| Drawing::Single { shape }),
        (proptest::option::of(arb_shape()), arb_shape(), ".{0,40}").prop_map(
            |(top, bottom, note)| Drawing::Layered { top, bottom, note }
        ),
        Just(Drawing::Blank),
    ]
}

proptest! {
    #[test]
    fn shapes_round_trip(shape in arb_shape()) {
        for (mode, resolver) in models::resolvers() {
            let buf = resolver.serialize(&shape).unwrap();
            prop_assert_eq!(&shape, &resolver.deserialize::<Shape>(&buf).unwrap(), "{:?}", mode);
        }
    }

    #[test]
    fn drawings_round_trip(drawing in arb_drawing()) {
        for (mode, resolver) in models::resolvers() {
            let buf = resolver.serialize(&drawing).unwrap();
            prop_assert_eq!(&drawing, &resolver.deserialize::<Drawing>(&buf).unwrap(), "{:?}", mode);
        }
    }

    /// Garbage never panics; it either decodes or errors.
    #[test]
    fn arbitrary_bytes_do_not_panic(buf in proptest::collection::vec(any::<u8>(), 0..64)) {
        for (_, resolver) in models::resolvers() {
            let _ = resolver.deserialize::<Drawing>(&buf);
            let _ = resolver.deserialize::<Option<Shape>>(&buf);
        }
    }
}
