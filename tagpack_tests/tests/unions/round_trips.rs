use super::models::{self, Celsius, CelsiusCodec, Drawing, Person, Reading, Shape};
use anyhow::Result;
use tagpack_union::{KeyMode, ResolveError, Resolver};
use tagpack_wire::serde::Ser;

pub fn every_case_in_both_modes() -> Result<()> {
    for (mode, resolver) in models::resolvers() {
        for shape in models::sample_shapes() {
            let buf = resolver.serialize(&shape)?;
            assert_eq!(shape, resolver.deserialize::<Shape>(&buf)?, "{mode:?}");

            let opt = Some(shape);
            let buf = resolver.serialize(&opt)?;
            assert_eq!(opt, resolver.deserialize::<Option<Shape>>(&buf)?, "{mode:?}");
        }
        for drawing in models::sample_drawings() {
            let buf = resolver.serialize(&drawing)?;
            assert_eq!(drawing, resolver.deserialize::<Drawing>(&buf)?, "{mode:?}");
        }
    }
    Ok(())
}

/// The two modes differ only in the payload: an array of values, or a map of names to values.
pub fn payload_shape_follows_mode() -> Result<()> {
    let rect = Shape::Rect { w: 1.0, h: 2.0 };
    let mut values = vec![];
    1.0f64.ser(&mut values)?;
    2.0f64.ser(&mut values)?;

    for (mode, resolver) in models::resolvers() {
        let buf = resolver.serialize(&rect)?;
        let mut exp = vec![0x92, 0x01];
        match mode {
            KeyMode::Index => {
                exp.push(0x92);
                exp.extend_from_slice(&values);
            }
            KeyMode::Name => {
                exp.push(0x82);
                exp.extend_from_slice(&[0xa1, b'w']);
                exp.extend_from_slice(&values[..9]);
                exp.extend_from_slice(&[0xa1, b'h']);
                exp.extend_from_slice(&values[9..]);
            }
        }
        assert_eq!(exp, buf, "{mode:?}");
    }
    Ok(())
}

pub fn nested_absence() -> Result<()> {
    for (mode, resolver) in models::resolvers() {
        let drawing = Drawing::Layered {
            top: None,
            bottom: Shape::Empty,
            note: String::new(),
        };
        let buf = resolver.serialize(&drawing)?;
        // The absent top is a lone nil where its envelope would be.
        let nils = buf.iter().filter(|b| **b == 0xc0).count();
        assert_eq!(1, nils, "{mode:?} {buf:x?}");
        assert_eq!(drawing, resolver.deserialize::<Drawing>(&buf)?, "{mode:?}");
    }
    Ok(())
}

pub fn params_bind_by_name() -> Result<()> {
    let resolver = Resolver::builder().union::<Person>().build();
    let person = Person::Known {
        name: String::from("Ada"),
        age: 36,
    };

    let buf = resolver.serialize(&person)?;
    // Fields go out in declared order, whatever the parameter order.
    assert_eq!(
        vec![0x92, 0x00, 0x82, 0xa4, b'N', b'a', b'm', b'e', 0xa3, b'A', b'd', b'a', 0xa3, b'A', b'g', b'e', 36],
        buf
    );
    assert_eq!(person, resolver.deserialize::<Person>(&buf)?);
    assert_eq!(
        Person::Anonymous,
        resolver.deserialize::<Person>(&resolver.serialize(&Person::Anonymous)?)?
    );
    Ok(())
}

pub fn registered_codec_for_field() -> Result<()> {
    let reading = Reading::Temperature {
        at: 1_700_000_000,
        value: Celsius(-4.5),
    };

    let resolver = Resolver::builder()
        .codec(CelsiusCodec)
        .union::<Reading>()
        .build();
    assert!(resolver.schemas().is_union::<Reading>());
    assert!(!resolver.schemas().is_union::<Celsius>());
    assert!(!resolver.schemas().is_union::<Option<Reading>>());
    let buf = resolver.serialize(&reading)?;
    assert_eq!(0xca, buf[buf.len() - 5]);
    assert_eq!(reading, resolver.deserialize::<Reading>(&buf)?);

    let without = Resolver::builder().union::<Reading>().build();
    let err = without.serialize(&reading).unwrap_err();
    assert!(
        matches!(
            err.downcast_ref::<ResolveError>(),
            Some(ResolveError::NoCodec { type_name }) if type_name.ends_with("Celsius")
        ),
        "{err:#}"
    );
    Ok(())
}
