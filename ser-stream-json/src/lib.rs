//! A streaming JSON reader and writer for [`ser-stream`](`ser_stream`).
/*!

Values are written from and read into statically typed storage, without an
intermediate JSON document. Every type picks its strategy by implementing
[`JsonSave`] and [`JsonLoad`]:

| Rust type ->                                   | JSON type
|------------------------------------------------|--------------------
| `u8`-`u64`, `usize`, `i8`-`i64`, `isize`       | `number`
| `f32`, `f64`                                   | `number`, `null` when not finite
| `bool`                                         | `boolean`
| `String`, `str` (write only)                   | `string`
| `Vec`, `VecDeque`, `LinkedList`                | `array`
| `[T]`, `[T; N]` (write only)                   | `array`
| `BTreeMap<String, V>`, `HashMap<String, V>`    | `object`
| `(K, V)`                                       | `array` of 2 elements
| records                                        | `object`, see [`ObjectReadHelper`]

* [`Writer`] breaks long or nested containers into indented lines according
to its [`Layout`], the [`Reader`] accepts any whitespace.
* [`Reader`] errors carry an approximate line number of the input.
* Strings escape only `"`, `\`, `\r`, `\n` and `\t`. Any other escaped
character is read verbatim.

```
use ser_stream_json::{de, ser, from_str, to_string};
use ser_stream_json::{JsonLoad, JsonSave, ObjectReadHelper, Reader, SerRead, SerWrite, Writer};

#[derive(Debug, Default, PartialEq)]
struct MyClass {
    data: Vec<String>,
    value: i32,
}

impl JsonSave for MyClass {
    fn save<W: SerWrite>(&self, writer: &mut Writer<W>) -> ser::Result<(), W::Error> {
        writer.begin_object(true)?;
        writer.write_object_key_value("data", &self.data)?;
        writer.write_object_key_value("value", &self.value)?;
        writer.end_object()
    }
}

impl JsonLoad for MyClass {
    fn load<R: SerRead>(&mut self, reader: &mut Reader<R>) -> de::Result<(), R::Error> {
        let mut helper = ObjectReadHelper::new();
        helper.declare_field("data", &mut self.data)?;
        helper.declare_field("value", &mut self.value)?;
        helper.read_all_fields(reader)
    }
}

let record = MyClass { data: vec!["a".into()], value: 42 };
let json = to_string(&record).unwrap();
assert_eq!(json, "{ \n  \"data\": [\n    \"a\"\n  ], \n  \"value\": 42\n}");
assert_eq!(from_str::<MyClass>(&json).unwrap(), record);
```
*/
#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

pub mod ser;
pub mod de;
pub mod handler;
pub mod helper;

pub use ser_stream;
pub use ser_stream::{SerError, SerRead, SerWrite, SliceReader, SliceWriter};

pub use ser::{
    Layout,
    Writer,
    to_string,
    to_string_compact,
    to_writer,
    to_writer_with_layout
};
pub use de::{
    Reader,
    from_reader,
    from_slice,
    from_str
};
pub use handler::{JsonLoad, JsonSave};
pub use helper::ObjectReadHelper;
