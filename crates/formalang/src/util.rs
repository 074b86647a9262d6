use std::fmt;

pub fn display_fn<F>(f: F) -> impl fmt::Display
where
    F: Fn(&mut fmt::Formatter<'_>) -> fmt::Result,
{
    struct DisplayFn<F> {
        f: F,
    }
    impl<F> fmt::Display for DisplayFn<F>
    where
        F: Fn(&mut fmt::Formatter<'_>) -> fmt::Result,
    {
        fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            (self.f)(formatter)
        }
    }
    DisplayFn { f }
}

/// Elements of `a` also present in `b`, in the order they appear in `a`.
pub fn intersection<T>(a: &[T], b: &[T]) -> Vec<T>
where
    T: Clone + PartialEq,
{
    a.iter().filter(|x| b.contains(x)).cloned().collect()
}

/// Elements of `a` and `b` without repetitions, first occurrence wins.
pub fn union<T>(a: &[T], b: &[T]) -> Vec<T>
where
    T: Clone + PartialEq,
{
    let mut out = dedup(a);
    for x in b {
        if !out.contains(x) {
            out.push(x.clone());
        }
    }
    out
}

/// Elements of `a` not present in `b`, in the order they appear in `a`.
pub fn difference<T>(a: &[T], b: &[T]) -> Vec<T>
where
    T: Clone + PartialEq,
{
    a.iter().filter(|x| !b.contains(x)).cloned().collect()
}

/// A copy of `values` keeping only the first occurrence of each element.
pub fn dedup<T>(values: &[T]) -> Vec<T>
where
    T: Clone + PartialEq,
{
    let mut out = Vec::with_capacity(values.len());
    for x in values {
        if !out.contains(x) {
            out.push(x.clone());
        }
    }
    out
}
