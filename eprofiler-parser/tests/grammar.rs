//! Parameterized accept/reject table for the symbol grammar.

use eprofiler_parser::symbols::parsing::parse_line;
use rstest::rstest;

#[rstest]
#[case::plain_variable("ns::Table::offset")]
#[case::const_function("ns::Table<int>::to_id() const")]
#[case::volatile_const("ns::Table<int>::to_id() const volatile")]
#[case::nested_templates("ns::A<ns::B<char, short>, long long int>::m")]
#[case::scoped_argument("ns::A<std::tuple<std::optional<int>, int>>::m")]
#[case::spaced_close_angles("ns::A<ns::B<int> >::m")]
#[case::cast_literal("ns::A<(char)65>::m")]
#[case::stacked_casts("ns::A<(unsigned long)(char)65>::m")]
#[case::signed_fundamental("ns::A<signed char, unsigned long int>::m")]
#[case::long_double("ns::A<long double>::m")]
#[case::array_argument("ns::A<char [12]>::m")]
#[case::constructed_array("ns::A<char [3]{72, 105, 0}>::m")]
#[case::integer_suffixes("ns::A<9ul, 3LL, 7u>::m")]
#[case::string_with_suffix("ns::A<\"Tag1\"_sc>::m")]
#[case::empty_pack("ns::A<>::m")]
fn accepts(#[case] line: &str) {
    parse_line(line).unwrap_or_else(|e| panic!("expected parse of `{line}`, got {e}"));
}

#[rstest]
#[case::bare_member("to_id() const")]
#[case::missing_close_angle("ns::A<int::m")]
#[case::missing_member("ns::A<int>")]
#[case::template_member("ns::A::m<int>")]
#[case::dangling_scope("ns::A::")]
#[case::unknown_qualifier("ns::A::m constexpr")]
#[case::empty_cast("ns::A<()5>::m")]
#[case::cast_without_literal("ns::A<(char)>::m")]
#[case::unterminated_string("ns::A<\"GET>::m")]
#[case::long_long_without_int("ns::A<long long>::m")]
#[case::signed_long_double("ns::A<signed long double>::m")]
#[case::foreign_character("ns::A$::m")]
fn rejects(#[case] line: &str) {
    assert!(parse_line(line).is_err(), "expected rejection of `{line}`");
}
